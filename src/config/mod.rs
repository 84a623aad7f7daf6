//! Runtime configuration.
//!
//! Everything is read from environment variables with development defaults,
//! so the binaries run against a local SQLite file out of the box. API keys
//! have no default: their absence is reported by the component that needs
//! them, not here.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable names. Public so tests and scripts can refer to them.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_SERPAPI_KEY: &str = "SERPAPI_KEY";
pub const ENV_SERPAPI_BASE_URL: &str = "SERPAPI_BASE_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_SUMMARY_MODEL: &str = "SUMMARY_MODEL";
pub const ENV_TRANSLATE_BASE_URL: &str = "TRANSLATE_BASE_URL";
pub const ENV_SOURCES_FILE: &str = "SOURCES_FILE";
pub const ENV_SUMMARY_PROMPT_FILE: &str = "SUMMARY_PROMPT_FILE";

/// Default development values used when environment variables are absent.
const DEFAULT_DATABASE_URL: &str = "sqlite://clearfeed.db?mode=rwc";
const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o";
const DEFAULT_TRANSLATE_BASE_URL: &str = "https://translate.googleapis.com";
const DEFAULT_SOURCES_FILE: &str = "data/sources.json";
const DEFAULT_SUMMARY_PROMPT_FILE: &str = "prompts/summary_prompt.txt";

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    database_url: String,
    serpapi_key: Option<String>,
    serpapi_base_url: String,
    openai_api_key: Option<String>,
    openai_base_url: String,
    summary_model: String,
    translate_base_url: String,
    sources_file: PathBuf,
    summary_prompt_file: PathBuf,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    ///
    /// Blank values count as unset. Base URLs must be absolute http(s) URLs.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = Self {
            database_url: var_or(ENV_DATABASE_URL, DEFAULT_DATABASE_URL),
            serpapi_key: non_empty_var(ENV_SERPAPI_KEY),
            serpapi_base_url: var_or(ENV_SERPAPI_BASE_URL, DEFAULT_SERPAPI_BASE_URL),
            openai_api_key: non_empty_var(ENV_OPENAI_API_KEY),
            openai_base_url: var_or(ENV_OPENAI_BASE_URL, DEFAULT_OPENAI_BASE_URL),
            summary_model: var_or(ENV_SUMMARY_MODEL, DEFAULT_SUMMARY_MODEL),
            translate_base_url: var_or(ENV_TRANSLATE_BASE_URL, DEFAULT_TRANSLATE_BASE_URL),
            sources_file: var_or(ENV_SOURCES_FILE, DEFAULT_SOURCES_FILE).into(),
            summary_prompt_file: var_or(ENV_SUMMARY_PROMPT_FILE, DEFAULT_SUMMARY_PROMPT_FILE)
                .into(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Development defaults (mirrors `from_env` with no env overrides).
    pub fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            serpapi_key: None,
            serpapi_base_url: DEFAULT_SERPAPI_BASE_URL.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            translate_base_url: DEFAULT_TRANSLATE_BASE_URL.to_string(),
            sources_file: DEFAULT_SOURCES_FILE.into(),
            summary_prompt_file: DEFAULT_SUMMARY_PROMPT_FILE.into(),
        }
    }

    /// SQLite connection string.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
    pub fn serpapi_key(&self) -> Option<&str> {
        self.serpapi_key.as_deref()
    }
    pub fn serpapi_base_url(&self) -> &str {
        &self.serpapi_base_url
    }
    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }
    /// Base of an OpenAI-compatible API, without the trailing `/chat/completions`.
    pub fn openai_base_url(&self) -> &str {
        &self.openai_base_url
    }
    pub fn summary_model(&self) -> &str {
        &self.summary_model
    }
    pub fn translate_base_url(&self) -> &str {
        &self.translate_base_url
    }
    /// JSON seed list of sources.
    pub fn sources_file(&self) -> &Path {
        &self.sources_file
    }
    pub fn summary_prompt_file(&self) -> &Path {
        &self.summary_prompt_file
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            (ENV_SERPAPI_BASE_URL, &self.serpapi_base_url),
            (ENV_OPENAI_BASE_URL, &self.openai_base_url),
            (ENV_TRANSLATE_BASE_URL, &self.translate_base_url),
        ] {
            let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
                field,
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }
        if !self.database_url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidValue {
                field: ENV_DATABASE_URL,
                reason: "expected a sqlite: connection string".to_string(),
            });
        }
        Ok(())
    }
}

fn var_or(key: &str, default: &str) -> String {
    non_empty_var(key).unwrap_or_else(|| default.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
