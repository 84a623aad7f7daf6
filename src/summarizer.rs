//! Article summaries from an OpenAI-compatible chat-completion endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{Config, ENV_OPENAI_API_KEY};
use crate::fetcher::get_client;
use crate::outcome::Outcome;

/// Marker replaced by the article text in the prompt template.
pub const ARTICLE_PLACEHOLDER: &str = "[ARTICLE TEXT HERE]";

/// Characters of article text sent to the model.
pub const MAX_INPUT_CHARS: usize = 4000;

const MAX_TOKENS: u32 = 300;

const BUILTIN_TEMPLATE: &str = "Summarize the following news article in three or four \
neutral sentences. Keep names, numbers and dates exact.\n\n[ARTICLE TEXT HERE]";

#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("completion had no choices")]
    EmptyResponse,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summary of `text`. On failure the value is a visible placeholder that
    /// is stored like any other summary.
    async fn summarize(&self, text: &str) -> Outcome<String>;
}

pub fn placeholder(cause: &impl std::fmt::Display) -> String {
    format!("[Summary unavailable: {cause}]")
}

/// First [`MAX_INPUT_CHARS`] characters of `text` put into `template`.
pub fn build_prompt(template: &str, text: &str) -> String {
    let truncated: String = text.chars().take(MAX_INPUT_CHARS).collect();
    template.replace(ARTICLE_PLACEHOLDER, &truncated)
}

/// The template at `path`, or the built-in one when the file is missing or
/// has no placeholder.
pub fn load_template(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(template) if template.contains(ARTICLE_PLACEHOLDER) => template,
        Ok(_) => {
            warn!(path = %path.display(), "prompt template has no placeholder, using built-in");
            BUILTIN_TEMPLATE.to_string()
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "using built-in prompt template");
            BUILTIN_TEMPLATE.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatSummarizer {
    endpoint: String,
    api_key: String,
    model: String,
    template: String,
}

impl ChatSummarizer {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<Self, SummarizerError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(SummarizerError::MissingCredential(ENV_OPENAI_API_KEY))?;
        Ok(Self {
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.into(),
            template: template.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SummarizerError> {
        Self::new(
            config.openai_base_url(),
            config.openai_api_key().map(str::to_string),
            config.summary_model(),
            load_template(config.summary_prompt_file()),
        )
    }

    async fn complete(&self, prompt: &str) -> Result<String, SummarizerError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "system",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
        };

        let response = get_client()
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::Status { status, body });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or(SummarizerError::EmptyResponse)
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    #[instrument(skip_all, fields(model = %self.model, chars = text.len()))]
    async fn summarize(&self, text: &str) -> Outcome<String> {
        let prompt = build_prompt(&self.template, text);
        match self.complete(&prompt).await {
            Ok(summary) => Outcome::Complete(summary),
            Err(e) => {
                warn!(error = %e, "summary unavailable");
                Outcome::degraded(placeholder(&e), e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = ChatSummarizer::new("https://api.openai.com/v1", None, "gpt-4o", BUILTIN_TEMPLATE)
            .unwrap_err();
        assert!(matches!(err, SummarizerError::MissingCredential(ENV_OPENAI_API_KEY)));
    }

    #[test]
    fn prompt_truncates_to_limit() {
        let text = "é".repeat(MAX_INPUT_CHARS + 10);
        let prompt = build_prompt("<<[ARTICLE TEXT HERE]>>", &text);
        assert_eq!(prompt.chars().count(), MAX_INPUT_CHARS + 4);
        assert!(prompt.starts_with("<<é"));
        assert!(prompt.ends_with("é>>"));
    }

    #[test]
    fn missing_template_file_uses_builtin() {
        let template = load_template(Path::new("/nonexistent/summary_prompt.txt"));
        assert_eq!(template, BUILTIN_TEMPLATE);
        assert!(template.contains(ARTICLE_PLACEHOLDER));
    }

    #[test]
    fn placeholder_is_visible() {
        assert_eq!(placeholder(&"timeout"), "[Summary unavailable: timeout]");
    }

    #[test]
    fn endpoint_is_built_from_base() {
        let summarizer =
            ChatSummarizer::new("http://localhost:8080/v1/", Some("k".into()), "m", "t").unwrap();
        assert_eq!(summarizer.endpoint, "http://localhost:8080/v1/chat/completions");
    }
}
