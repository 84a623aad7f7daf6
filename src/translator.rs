//! Summary translation through a Google-Translate-compatible endpoint.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tracing::{instrument, warn};

use crate::config::Config;
use crate::fetcher::get_client;
use crate::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    Hindi,
    Spanish,
    #[default]
    English,
}

impl Language {
    /// Display name to language; anything unrecognized is English.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "hindi" => Self::Hindi,
            "spanish" => Self::Spanish,
            _ => Self::English,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Hindi => "hi",
            Self::Spanish => "es",
            Self::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hindi => "Hindi",
            Self::Spanish => "Spanish",
            Self::English => "English",
        };
        f.write_str(name)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// `text` in `target`, or `text` unchanged when translation fails.
    async fn translate(&self, text: &str, target: Language) -> Outcome<String>;
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.translate_base_url())
    }

    async fn request(&self, text: &str, target: Language) -> Result<String, String> {
        let response = get_client()
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("translation endpoint returned {status}"));
        }

        let body: Value = response.json().await.map_err(|e| e.to_string())?;
        parse_translation(&body).ok_or_else(|| "unexpected translation payload".to_string())
    }
}

/// Join the translated segments of a `[[["text", "source", ...], ...], ...]`
/// payload.
fn parse_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    (!translated.is_empty()).then_some(translated)
}

#[async_trait]
impl Translator for GoogleTranslator {
    #[instrument(skip_all, fields(target = %target))]
    async fn translate(&self, text: &str, target: Language) -> Outcome<String> {
        if text.trim().is_empty() {
            return Outcome::Complete(text.to_string());
        }

        match self.request(text, target).await {
            Ok(translated) => Outcome::Complete(translated),
            Err(e) => {
                warn!(error = %e, "translation failed, keeping original");
                Outcome::degraded(text.to_string(), e)
            }
        }
    }
}
