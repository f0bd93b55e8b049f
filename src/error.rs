//! Error types for the blog generation pipeline.
//!
//! Each pipeline stage has its own error; `RowError` wraps them at the
//! per-row boundary inside the orchestrator.

use thiserror::Error;

/// Input file errors
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open input file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Input file is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Malformed row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors talking to the remote text-generation service
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),

    #[error("No choices in response")]
    NoChoices,
}

/// Category classification errors
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Unexpected category received: {0:?}")]
    UnexpectedCategory(String),

    #[error("Classification request failed: {0}")]
    Completion(#[from] CompletionError),
}

/// Blog content generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Generation service returned empty content")]
    EmptyContent,
}

/// Blog record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Blog record is missing required field: {0}")]
    MissingField(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store connection lock poisoned")]
    Poisoned,
}

/// Failure of a single row; never aborts the batch
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Batch-level failures that stop the run before any row is processed
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Generation service preflight failed: {0}")]
    Preflight(#[source] CompletionError),

    #[error(transparent)]
    Read(#[from] ReadError),
}
