use crate::classifier::ClassifierStrategy;
use crate::completion::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::generator::DEFAULT_BLOG_MAX_TOKENS;
use anyhow::Context;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix, e.g. `BLOGFORGE_OPENAI_API_KEY`
pub const ENV_PREFIX: &str = "BLOGFORGE";

#[derive(Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Generation service API key; only the batch needs it
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Generation service base URL; `/completions` is appended
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// CSV file processed by the batch
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Check the generation service before the batch; exit if unreachable
    #[serde(default = "default_preflight")]
    pub preflight: bool,

    #[serde(default)]
    pub classifier: ClassifierStrategy,

    /// Token limit for blog posts
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("blogs.db")
}

fn default_input_path() -> PathBuf {
    PathBuf::from("data.csv")
}

fn default_port() -> u16 {
    4000
}

fn default_preflight() -> bool {
    true
}

fn default_max_tokens() -> u32 {
    DEFAULT_BLOG_MAX_TOKENS
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// API key for the generation client; missing or blank is an error
    pub fn require_api_key(&self) -> anyhow::Result<&str> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .context("BLOGFORGE_OPENAI_API_KEY is required")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Keeps the API key out of logs
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("database_path", &self.database_path)
            .field("input_path", &self.input_path)
            .field("port", &self.port)
            .field("preflight", &self.preflight)
            .field("classifier", &self.classifier)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests share process environment; run them one at a time
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "BLOGFORGE_OPENAI_API_KEY",
        "BLOGFORGE_PORT",
        "BLOGFORGE_PREFLIGHT",
        "BLOGFORGE_CLASSIFIER",
        "BLOGFORGE_DATABASE_PATH",
        "BLOGFORGE_MAX_TOKENS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("BLOGFORGE_OPENAI_API_KEY", "sk-test");

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.require_api_key().unwrap(), "sk-test");
        assert_eq!(settings.port, 4000);
        assert!(settings.preflight);
        assert_eq!(settings.classifier, ClassifierStrategy::Remote);
        assert_eq!(settings.database_path, PathBuf::from("blogs.db"));
        assert_eq!(settings.input_path, PathBuf::from("data.csv"));
        assert_eq!(settings.max_tokens, 150);
        assert_eq!(settings.model, "text-davinci-003");
        assert_eq!(settings.request_timeout(), Duration::from_secs(60));

        clear_env();
    }

    #[test]
    fn test_overrides() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("BLOGFORGE_OPENAI_API_KEY", "sk-test");
        std::env::set_var("BLOGFORGE_PORT", "8080");
        std::env::set_var("BLOGFORGE_PREFLIGHT", "false");
        std::env::set_var("BLOGFORGE_CLASSIFIER", "keyword");
        std::env::set_var("BLOGFORGE_DATABASE_PATH", "/tmp/other.db");
        std::env::set_var("BLOGFORGE_MAX_TOKENS", "300");

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.port, 8080);
        assert!(!settings.preflight);
        assert_eq!(settings.classifier, ClassifierStrategy::Keyword);
        assert_eq!(settings.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(settings.max_tokens, 300);

        clear_env();
    }

    #[test]
    fn test_settings_load_without_api_key() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();

        // The read-only server starts without a generation key
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.openai_api_key, None);
        assert_eq!(settings.port, 4000);

        let err = settings.require_api_key().unwrap_err();
        assert!(err.to_string().contains("BLOGFORGE_OPENAI_API_KEY is required"));
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("BLOGFORGE_OPENAI_API_KEY", "  ");

        let settings = Settings::from_env().unwrap();
        assert!(settings.require_api_key().is_err());

        clear_env();
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("BLOGFORGE_OPENAI_API_KEY", "sk-secret");

        let settings = Settings::from_env().unwrap();
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("sk-secret"));

        clear_env();
    }
}
