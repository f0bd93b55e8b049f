// 🔁 Batch Orchestrator - read → classify → generate → persist
// Strictly sequential; a failing row is logged and skipped, never fatal

use crate::classifier::Classifier;
use crate::completion::CompletionClient;
use crate::db::{BlogRecord, BlogStore};
use crate::error::{CompletionError, PipelineError, ReadError, RowError};
use crate::generator::ContentGenerator;
use crate::parser::{InputRow, RowSource};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PREFLIGHT_PROMPT: &str = "This is a test to see if the OpenAI API is working.";
pub const PREFLIGHT_MAX_TOKENS: u32 = 5;

// ============================================================================
// ROW STAGES
// ============================================================================

/// Step a row failed at. A row moves classify → generate → persist and stops
/// at the first failing step, leaving nothing behind in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStage {
    Read,
    Classify,
    Generate,
    Persist,
}

impl fmt::Display for RowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RowStage::Read => "read",
            RowStage::Classify => "classify",
            RowStage::Generate => "generate",
            RowStage::Persist => "persist",
        };
        f.write_str(s)
    }
}

impl From<&RowError> for RowStage {
    fn from(err: &RowError) -> Self {
        match err {
            RowError::Read(_) => RowStage::Read,
            RowError::Classification(_) => RowStage::Classify,
            RowError::Generation(_) => RowStage::Generate,
            RowError::Store(_) => RowStage::Persist,
        }
    }
}

/// Counts reported once the batch has finished
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub persisted: usize,
    pub failed: usize,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    client: Arc<dyn CompletionClient>,
    classifier: Box<dyn Classifier>,
    generator: ContentGenerator,
    store: BlogStore,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        classifier: Box<dyn Classifier>,
        generator: ContentGenerator,
        store: BlogStore,
    ) -> Self {
        Self {
            client,
            classifier,
            generator,
            store,
        }
    }

    /// One test call to the generation service; ok iff it returns any choice
    pub async fn preflight(&self) -> Result<(), CompletionError> {
        let choices = self
            .client
            .complete(PREFLIGHT_PROMPT, PREFLIGHT_MAX_TOKENS)
            .await?;

        if choices.is_empty() {
            return Err(CompletionError::NoChoices);
        }

        info!("Generation service is reachable");
        Ok(())
    }

    /// Full run: optional preflight, then the batch over `input_path`
    pub async fn run(
        &self,
        input_path: &Path,
        preflight: bool,
    ) -> Result<BatchSummary, PipelineError> {
        if preflight {
            self.preflight().await.map_err(PipelineError::Preflight)?;
        }

        let rows = RowSource::open(input_path)?;
        info!(
            input = %input_path.display(),
            strategy = self.classifier.strategy().as_str(),
            "Starting blog batch"
        );

        Ok(self.run_batch(rows).await)
    }

    /// Process every row in order; completes unconditionally
    pub async fn run_batch<I>(&self, rows: I) -> BatchSummary
    where
        I: IntoIterator<Item = Result<InputRow, ReadError>>,
    {
        let mut summary = BatchSummary::default();

        for row in rows {
            summary.total += 1;

            let (name, line, result) = match row {
                Ok(row) => {
                    let result = self.process_row(&row).await;
                    (row.name, row.line_number, result)
                }
                Err(e) => {
                    let line = match &e {
                        ReadError::MalformedRow { line, .. } => *line,
                        _ => 0,
                    };
                    (String::new(), line, Err(RowError::from(e)))
                }
            };

            match result {
                Ok(id) => {
                    summary.persisted += 1;
                    info!(%name, %id, "Row persisted");
                }
                Err(error) => {
                    summary.failed += 1;
                    let stage = RowStage::from(&error);
                    warn!(%name, line, %stage, %error, "Error processing row");
                }
            }
        }

        info!(
            total = summary.total,
            persisted = summary.persisted,
            failed = summary.failed,
            "All rows processed"
        );
        summary
    }

    /// Classify, generate and persist one row; returns the new record id
    pub async fn process_row(&self, row: &InputRow) -> Result<String, RowError> {
        info!(name = %row.name, line = row.line_number, "Processing row");

        let category = self.classifier.classify(&row.name).await?;
        debug!(name = %row.name, category = ?category, "Row classified");

        let blog_content = self.generator.generate(category).await?;
        debug!(name = %row.name, chars = blog_content.len(), "Blog post generated");

        let record = BlogRecord::new(
            row.name.clone(),
            row.average_revenue,
            row.average_cost_to_start,
            blog_content,
        );
        self.store.save(&record)?;

        Ok(record.id)
    }
}

// ============================================================================
// TESTS
// ============================================================================
