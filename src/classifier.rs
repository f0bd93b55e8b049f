// 🏷️ Category Classifier - business name → profession category
// Two strategies behind one trait: ask the generation service, or match keywords

use crate::completion::{complete_first, CompletionClient};
use crate::error::ClassificationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

const CLASSIFY_MAX_TOKENS: u32 = 10;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Doctor,
    Dentist,
    Accountant,
}

impl Category {
    /// Priority order used when a name matches several categories
    pub const ALL: [Category; 3] = [Category::Doctor, Category::Dentist, Category::Accountant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Doctor => "doctor",
            Category::Dentist => "dentist",
            Category::Accountant => "accountant",
        }
    }

    /// Substrings that select this category in keyword matching.
    ///
    /// A name matching several categories gets the first one in
    /// `Category::ALL` order (doctor, then dentist, then accountant), so
    /// "Doctor & Dentist Partners" is a doctor.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Doctor => &["doctor"],
            Category::Dentist => &["dentist", "dental"],
            Category::Accountant => &["accountant", "accounting"],
        }
    }

    /// Parse an exact label (case-sensitive)
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Classifier - decides which category a business name belongs to
///
/// `Ok(None)` means "no category"; the generator still accepts it.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, name: &str) -> Result<Option<Category>, ClassificationError>;

    /// Strategy name for logging
    fn strategy(&self) -> ClassifierStrategy;
}

/// Which classifier the pipeline runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierStrategy {
    /// Ask the generation service (default)
    #[default]
    Remote,
    /// Local substring matching
    Keyword,
}

impl ClassifierStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierStrategy::Remote => "remote",
            ClassifierStrategy::Keyword => "keyword",
        }
    }

    /// Build the classifier for this strategy
    pub fn build(&self, client: Arc<dyn CompletionClient>) -> Box<dyn Classifier> {
        match self {
            ClassifierStrategy::Remote => Box::new(RemoteClassifier::new(client)),
            ClassifierStrategy::Keyword => Box::new(KeywordClassifier),
        }
    }
}

impl FromStr for ClassifierStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(ClassifierStrategy::Remote),
            "keyword" => Ok(ClassifierStrategy::Keyword),
            other => Err(format!("unknown classifier strategy: {}", other)),
        }
    }
}

// ============================================================================
// REMOTE CLASSIFIER
// ============================================================================

pub struct RemoteClassifier {
    client: Arc<dyn CompletionClient>,
}

impl RemoteClassifier {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        RemoteClassifier { client }
    }

    pub fn prompt_for(name: &str) -> String {
        format!(
            "Given the name \"{}\", determine whether it is most likely associated with a \"doctor\", \"dentist\", or \"accountant\". Respond with only one of these three words.",
            name
        )
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, name: &str) -> Result<Option<Category>, ClassificationError> {
        let prompt = RemoteClassifier::prompt_for(name);
        let reply = complete_first(self.client.as_ref(), &prompt, CLASSIFY_MAX_TOKENS).await?;

        let label = reply.trim().to_lowercase();
        debug!(name, %label, "Remote classification reply");

        Category::from_label(&label)
            .map(Some)
            .ok_or(ClassificationError::UnexpectedCategory(label))
    }

    fn strategy(&self) -> ClassifierStrategy {
        ClassifierStrategy::Remote
    }
}

// ============================================================================
// KEYWORD CLASSIFIER
// ============================================================================

/// Case-insensitive substring matching, priority doctor → dentist → accountant
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn match_name(name: &str) -> Option<Category> {
        let name_lower = name.to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.keywords().iter().any(|k| name_lower.contains(k)))
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, name: &str) -> Result<Option<Category>, ClassificationError> {
        Ok(KeywordClassifier::match_name(name))
    }

    fn strategy(&self) -> ClassifierStrategy {
        ClassifierStrategy::Keyword
    }
}

// ============================================================================
// TESTS
// ============================================================================
