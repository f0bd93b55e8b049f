// ✍️ Content Generator - blog post text for a category

use crate::classifier::Category;
use crate::completion::{complete_first, CompletionClient};
use crate::error::GenerationError;
use std::sync::Arc;

pub const DEFAULT_BLOG_MAX_TOKENS: u32 = 150;

pub struct ContentGenerator {
    client: Arc<dyn CompletionClient>,
    max_tokens: u32,
}

impl ContentGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, max_tokens: u32) -> Self {
        ContentGenerator { client, max_tokens }
    }

    /// Fixed-template prompt; a missing category renders as an empty string
    pub fn prompt_for(category: Option<Category>) -> String {
        format!(
            "Write a professional blog post in 2-3 paragraphs about a {}, highlighting their importance in the industry and any challenges they face.",
            category.map(|c| c.as_str()).unwrap_or("")
        )
    }

    /// Generate trimmed blog text; never returns an empty string
    pub async fn generate(&self, category: Option<Category>) -> Result<String, GenerationError> {
        let prompt = ContentGenerator::prompt_for(category);
        let text = complete_first(self.client.as_ref(), &prompt, self.max_tokens).await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        Ok(text.to_string())
    }
}
