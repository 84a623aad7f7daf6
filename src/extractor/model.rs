use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Readable content pulled out of an article page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub url: String,
    pub title: String,
    pub site_name: Option<String>,
    pub text: String,
    /// Representative image detected on the page.
    pub top_image: Option<String>,
    /// ISO 639-1 code where one exists.
    pub language: Option<String>,
}

impl ExtractedArticle {
    /// Placeholder handed back when the page could not be downloaded or read.
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct ReadabilityResult {
    pub title: String,
    pub site_name: Option<String>,
    pub text: String,
}

pub fn normalize_whitespace(text: &str) -> String {
    let spaced = SPACE_RUN.replace_all(text.trim(), " ");
    BLANK_LINES.replace_all(&spaced, "\n\n").to_string()
}
