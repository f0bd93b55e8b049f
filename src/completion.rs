//! Generation service client
//!
//! Thin client for an OpenAI-style `/completions` endpoint. Both the remote
//! classifier and the content generator go through the `CompletionClient`
//! trait, which is also where tests substitute a scripted service.

use crate::error::CompletionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "text-davinci-003";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can turn a prompt into generated text choices
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the text of every choice, in order
    async fn complete(&self, prompt: &str, max_tokens: u32)
        -> Result<Vec<String>, CompletionError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

fn map_http_error(error: reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        CompletionError::RequestFailed(format!("Connection error: {}", error))
    } else {
        CompletionError::RequestFailed(format!("HTTP error: {}", error))
    }
}

/// OpenAI completions client
pub struct OpenAiClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        model: String,
        api_key: String,
        base_url: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| CompletionError::ClientBuild(e.to_string()))?;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            model,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<Vec<String>, CompletionError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens,
        };

        let url = format!("{}/completions", self.base_url);
        debug!(%url, max_tokens, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                401 => CompletionError::AuthFailed(body),
                code => CompletionError::Status { status: code, body },
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        Ok(completion.choices.into_iter().map(|c| c.text).collect())
    }
}

/// First choice of a completion, or `NoChoices`
pub async fn complete_first(
    client: &dyn CompletionClient,
    prompt: &str,
    max_tokens: u32,
) -> Result<String, CompletionError> {
    client
        .complete(prompt, max_tokens)
        .await?
        .into_iter()
        .next()
        .ok_or(CompletionError::NoChoices)
}
