use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::fetcher::{ContentKind, FetchError, fetch_as};

/// File names tried when a page links no feed at all.
const GUESSED_PATHS: &[&str] = &[
    "atom.xml",
    "index.atom",
    "index.rdf",
    "rss.xml",
    "index.xml",
    "index.rss",
];

/// Substrings that make a link worth probing.
const FEEDLIKE: &[&str] = &["rss", "rdf", "xml", "atom", "feed"];

/// Ranking of found feeds, best first.
const RANKED_KEYWORDS: &[&str] = &["atom", "rss", "rdf", ".xml", "feed"];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedFinder: Send + Sync {
    /// Feed URLs advertised by, or guessable from, the page at `url`.
    async fn find_feeds(&self, url: &str) -> Result<Vec<String>, FetchError>;
}

/// Autodiscovery over HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFeedFinder;

#[async_trait]
impl FeedFinder for HttpFeedFinder {
    async fn find_feeds(&self, url: &str) -> Result<Vec<String>, FetchError> {
        find_feeds(url).await
    }
}

/// A document is a feed when it is not HTML and carries a feed root element.
pub fn is_feed(text: &str) -> bool {
    let lower = text.to_lowercase();
    if lower.contains("<html") {
        return false;
    }
    lower.contains("<rss") || lower.contains("<rdf") || lower.contains("<feed")
}

#[instrument(skip_all, fields(url = %url))]
pub async fn find_feeds(url: &str) -> Result<Vec<String>, FetchError> {
    let page = fetch_as(url, ContentKind::Any).await?;
    if is_feed(&page.body_utf8) {
        return Ok(vec![page.url_final.to_string()]);
    }

    let base = page.url_final.clone();
    let (alternates, anchors) = page_links(&page.body_utf8, &base);

    let found = probe_all(&alternates).await;
    if !found.is_empty() {
        return Ok(rank(found));
    }

    let found = probe_all(&anchors).await;
    if !found.is_empty() {
        return Ok(rank(found));
    }

    let guesses: Vec<String> = GUESSED_PATHS
        .iter()
        .filter_map(|name| base.join(name).ok())
        .map(|u| u.to_string())
        .collect();
    Ok(rank(probe_all(&guesses).await))
}

/// `<link rel=alternate>` feed links and same-site `<a>` links that look like
/// feeds, both resolved against `base`.
fn page_links(html: &str, base: &Url) -> (Vec<String>, Vec<String>) {
    let document = Html::parse_document(html);

    let mut alternates = Vec::new();
    if let Ok(selector) = Selector::parse("link[rel][href]") {
        for el in document.select(&selector) {
            let rel = el.value().attr("rel").unwrap_or_default().to_lowercase();
            let kind = el.value().attr("type").unwrap_or_default().to_lowercase();
            if !rel.split_whitespace().any(|r| r == "alternate") {
                continue;
            }
            if !["rss", "atom", "xml", "rdf"].iter().any(|k| kind.contains(k)) {
                continue;
            }
            if let Some(href) = el.value().attr("href")
                && let Ok(joined) = base.join(href.trim())
            {
                push_unique(&mut alternates, joined.to_string());
            }
        }
    }

    let mut anchors = Vec::new();
    if let Ok(selector) = Selector::parse("a[href]") {
        for href in document.select(&selector).filter_map(|el| el.value().attr("href")) {
            let lower = href.to_lowercase();
            if !FEEDLIKE.iter().any(|k| lower.contains(k)) {
                continue;
            }
            if let Ok(joined) = base.join(href.trim())
                && joined.host_str() == base.host_str()
            {
                push_unique(&mut anchors, joined.to_string());
            }
        }
    }

    (alternates, anchors)
}

fn push_unique(list: &mut Vec<String>, url: String) {
    if !list.contains(&url) {
        list.push(url);
    }
}

async fn probe_all(urls: &[String]) -> Vec<String> {
    let mut feeds = Vec::new();
    for url in urls {
        if probe(url).await {
            feeds.push(url.clone());
        }
    }
    feeds
}

/// Secondary fetches never fail the discovery; an unreachable guess is just
/// not a feed.
async fn probe(url: &str) -> bool {
    match fetch_as(url, ContentKind::Any).await {
        Ok(response) => is_feed(&response.body_utf8),
        Err(e) => {
            debug!(url = %url, error = %e, "probe failed");
            false
        }
    }
}

fn feed_rank(url: &str) -> i32 {
    if url.contains("comments") {
        return -2;
    }
    if url.contains("georss") {
        return -1;
    }
    let levels = RANKED_KEYWORDS.len() as i32;
    RANKED_KEYWORDS
        .iter()
        .position(|k| url.contains(k))
        .map(|pos| levels - pos as i32)
        .unwrap_or(0)
}

/// Deduplicated, best first; ties keep discovery order.
fn rank(mut feeds: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(feeds.len());
    feeds.retain(|f| {
        if seen.contains(f) {
            false
        } else {
            seen.push(f.clone());
            true
        }
    });
    feeds.sort_by_key(|f| std::cmp::Reverse(feed_rank(f)));
    feeds
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryLimits {
    pub max_feeds: usize,
    pub per_site: usize,
    /// Deadline for a single candidate, including every probe it triggers.
    pub timeout: Duration,
}

/// What happened to each candidate of one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveryReport {
    pub candidates: usize,
    pub feeds: Vec<String>,
    pub skipped_non_http: Vec<String>,
    pub skipped_errors: Vec<String>,
    pub skipped_timeouts: Vec<String>,
}

/// Run autodiscovery on each candidate in order until `max_feeds` are found.
///
/// Every candidate runs in its own task under `limits.timeout`; on expiry the
/// task is aborted and whatever it would have found is discarded.
pub async fn discover_feeds(
    finder: Arc<dyn FeedFinder>,
    urls: &[String],
    limits: DiscoveryLimits,
) -> DiscoveryReport {
    let mut report = DiscoveryReport {
        candidates: urls.len(),
        ..DiscoveryReport::default()
    };

    for (idx, url) in urls.iter().enumerate() {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            debug!(url = %url, "skipping non-http candidate");
            report.skipped_non_http.push(url.clone());
            continue;
        }

        debug!(url = %url, position = idx + 1, total = urls.len(), "discovering feeds");
        let task_finder = Arc::clone(&finder);
        let target = url.clone();
        let mut handle = tokio::spawn(async move { task_finder.find_feeds(&target).await });

        match timeout(limits.timeout, &mut handle).await {
            Ok(Ok(Ok(found))) => {
                debug!(url = %url, found = found.len(), "feeds found");
                report.feeds.extend(found.into_iter().take(limits.per_site));
            }
            Ok(Ok(Err(e))) => {
                if e.is_timeout() {
                    warn!(url = %url, error = %e, "request timed out during discovery");
                } else if e.is_connection_issue() {
                    warn!(url = %url, error = %e, "connection error during discovery");
                } else {
                    warn!(url = %url, error = %e, "feed discovery failed");
                }
                report.skipped_errors.push(url.clone());
            }
            Ok(Err(join_error)) => {
                warn!(url = %url, error = %join_error, "discovery task failed");
                report.skipped_errors.push(url.clone());
            }
            Err(_) => {
                handle.abort();
                warn!(url = %url, timeout_secs = limits.timeout.as_secs_f64(), "feed discovery timed out");
                report.skipped_timeouts.push(url.clone());
            }
        }

        if report.feeds.len() >= limits.max_feeds {
            break;
        }
    }

    report.feeds.truncate(limits.max_feeds);
    info!(
        candidates = report.candidates,
        feeds = report.feeds.len(),
        skipped_non_http = report.skipped_non_http.len(),
        skipped_errors = report.skipped_errors.len(),
        skipped_timeouts = report.skipped_timeouts.len(),
        "feed discovery finished"
    );
    report
}
