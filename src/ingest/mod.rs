//! Turn stored sources into article records.

pub mod filter;

use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::entities::Source;
use crate::extractor::{ArticleExtractor, ReadabilityExtractor};
use crate::feeds::{FeedEntry, FeedReader, HttpFeedReader};
use crate::outcome::Outcome;

/// Articles taken from a single feed.
pub const PER_SOURCE_LIMIT: usize = 5;

/// Global cap used by the command line when none is given.
pub const DEFAULT_MAX_ARTICLES: usize = 20;

/// An article ready to be summarized and stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    pub source_name: String,
    pub raw_text: String,
    pub image_url: Option<String>,
    /// As found in the feed; normalized when stored.
    pub published: Option<String>,
    pub tags: Vec<String>,
    pub language: Option<String>,
}

/// Sources are treated as feeds when their URL mentions "rss".
pub fn is_feed_source(url: &str) -> bool {
    url.to_lowercase().contains("rss")
}

pub struct ArticleFetcher {
    feeds: Arc<dyn FeedReader>,
    extractor: Arc<dyn ArticleExtractor>,
    cancel: CancellationToken,
}

impl Default for ArticleFetcher {
    fn default() -> Self {
        Self::new(Arc::new(HttpFeedReader), Arc::new(ReadabilityExtractor))
    }
}

impl ArticleFetcher {
    pub fn new(feeds: Arc<dyn FeedReader>, extractor: Arc<dyn ArticleExtractor>) -> Self {
        Self {
            feeds,
            extractor,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between articles once `token` is cancelled, keeping what was
    /// fetched so far.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walk `sources` in order until `max_articles` records are collected.
    ///
    /// Feed sources contribute at most [`PER_SOURCE_LIMIT`] entries that match
    /// their `filter_topic`; an entry whose page cannot be extracted keeps
    /// its feed summary as text. Any other source is read as one article,
    /// dropped when extraction fails or the topic is not mentioned.
    #[instrument(skip_all, fields(sources = sources.len(), max_articles))]
    pub async fn fetch_articles(&self, sources: &[Source], max_articles: usize) -> Vec<ArticleRecord> {
        let mut articles = Vec::new();

        for source in sources {
            if articles.len() >= max_articles || self.cancel.is_cancelled() {
                break;
            }

            if is_feed_source(&source.url) {
                self.fetch_from_feed(source, max_articles, &mut articles).await;
            } else {
                self.fetch_direct(source, &mut articles).await;
            }
        }

        info!(count = articles.len(), "articles fetched");
        articles
    }

    async fn fetch_from_feed(
        &self,
        source: &Source,
        max_articles: usize,
        articles: &mut Vec<ArticleRecord>,
    ) {
        let entries = self.feeds.read_feed(&source.url).await;
        if let Some(cause) = entries.cause() {
            warn!(source = %source.name, cause, "feed unavailable");
        }
        let entries = filter::filter_entries(entries.into_value(), source.filter_topic.as_deref());

        let mut taken = 0;
        for entry in entries {
            if articles.len() >= max_articles || taken >= PER_SOURCE_LIMIT {
                break;
            }
            if self.cancel.is_cancelled() {
                debug!("cancelled");
                break;
            }
            if entry.link.trim().is_empty() {
                debug!(title = %entry.title, "entry without link");
                continue;
            }

            let record = self.from_entry(source, entry).await;
            articles.push(record);
            taken += 1;
        }
    }

    async fn from_entry(&self, source: &Source, entry: FeedEntry) -> ArticleRecord {
        let published = Some(entry.published.clone()).filter(|p| !p.is_empty());

        match self.extractor.extract(&entry.link).await {
            Outcome::Complete(page) => ArticleRecord {
                title: if entry.title.is_empty() { page.title } else { entry.title },
                url: entry.link,
                source_name: source.name.clone(),
                raw_text: page.text,
                image_url: entry.image_url.or(page.top_image),
                published,
                tags: entry.tags,
                language: page.language,
            },
            Outcome::Degraded { cause, .. } => {
                debug!(url = %entry.link, cause = %cause, "using feed summary");
                ArticleRecord {
                    title: entry.title,
                    url: entry.link,
                    source_name: source.name.clone(),
                    raw_text: entry.summary,
                    image_url: entry.image_url,
                    published,
                    tags: entry.tags,
                    language: None,
                }
            }
        }
    }

    async fn fetch_direct(&self, source: &Source, articles: &mut Vec<ArticleRecord>) {
        let page = match self.extractor.extract(&source.url).await {
            Outcome::Complete(page) => page,
            Outcome::Degraded { cause, .. } => {
                debug!(source = %source.name, cause = %cause, "skipping unreadable source");
                return;
            }
        };

        if let Some(topic) = source.filter_topic.as_deref().filter(|t| !t.trim().is_empty())
            && !filter::article_matches(&page, topic)
        {
            debug!(source = %source.name, topic, "page does not mention topic");
            return;
        }

        articles.push(ArticleRecord {
            title: page.title,
            url: source.url.clone(),
            source_name: source.name.clone(),
            raw_text: page.text,
            image_url: page.top_image,
            published: None,
            tags: Vec::new(),
            language: page.language,
        });
    }
}
