pub mod image;
pub mod language;
pub mod model;
pub mod reader;

#[cfg(test)]
mod tests;

pub use model::ExtractedArticle;

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, instrument, warn};

use crate::fetcher::{PageResponse, fetch};
use crate::outcome::Outcome;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    /// Download `url` and pull out its readable content. Failures degrade to
    /// [`ExtractedArticle::empty`].
    async fn extract(&self, url: &str) -> Outcome<ExtractedArticle>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityExtractor;

#[async_trait]
impl ArticleExtractor for ReadabilityExtractor {
    async fn extract(&self, url: &str) -> Outcome<ExtractedArticle> {
        extract_url(url).await
    }
}

#[instrument(skip_all, fields(url = %url))]
pub async fn extract_url(url: &str) -> Outcome<ExtractedArticle> {
    match fetch(url).await {
        Ok(response) => match extract_page(&response) {
            Some(article) => Outcome::Complete(article),
            None => {
                debug!("no readable text on page");
                Outcome::degraded(ExtractedArticle::empty(url), "no readable text")
            }
        },
        Err(e) => {
            warn!(error = %e, "article download failed");
            Outcome::degraded(ExtractedArticle::empty(url), e)
        }
    }
}

/// Extract from an already downloaded page.
pub fn extract_page(resp: &PageResponse) -> Option<ExtractedArticle> {
    let result = reader::extract(&resp.body_utf8, &resp.url_final)?;
    let text = model::normalize_whitespace(&result.text);
    if text.is_empty() {
        return None;
    }

    let document = Html::parse_document(&resp.body_utf8);
    let top_image = image::top_image(&document, &resp.url_final);

    Some(ExtractedArticle {
        url: resp.url_final.to_string(),
        title: result.title.trim().to_string(),
        site_name: result.site_name,
        language: language::detect_language(&text),
        text,
        top_image,
    })
}
