// Blog Forge - Core Library
// Exposes all modules for use in the batch CLI, API server, and tests

pub mod classifier;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod logging;
pub mod parser;
pub mod pipeline;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use classifier::{Category, Classifier, ClassifierStrategy, KeywordClassifier, RemoteClassifier};
pub use completion::{CompletionClient, OpenAiClient};
pub use config::Settings;
pub use db::{BlogRecord, BlogStore, READ_LIMIT};
pub use error::{
    ClassificationError, CompletionError, GenerationError, PipelineError, ReadError, RowError,
    StoreError,
};
pub use generator::ContentGenerator;
pub use parser::{InputRow, RowSource};
pub use pipeline::{BatchSummary, Pipeline, RowStage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
