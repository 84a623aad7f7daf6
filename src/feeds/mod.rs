//! RSS/Atom/RDF feed reading.

pub mod parser;
pub mod raw_dates;

pub use parser::{FeedEntry, parse_feed_bytes};
pub use raw_dates::RawTimestamp;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::fetcher::{ContentKind, fetch_as};
use crate::outcome::Outcome;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedReader: Send + Sync {
    /// Fetch and parse `url`. Unreachable or malformed feeds come back as a
    /// degraded empty list.
    async fn read_feed(&self, url: &str) -> Outcome<Vec<FeedEntry>>;
}

/// Reads feeds over the shared HTTP client.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFeedReader;

#[async_trait]
impl FeedReader for HttpFeedReader {
    async fn read_feed(&self, url: &str) -> Outcome<Vec<FeedEntry>> {
        parse_feed(url).await
    }
}

#[instrument(skip_all, fields(url = %url))]
pub async fn parse_feed(url: &str) -> Outcome<Vec<FeedEntry>> {
    let response = match fetch_as(url, ContentKind::Feed).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "feed unreachable");
            return Outcome::failed(e);
        }
    };

    // raw bytes: the XML prolog names the encoding
    match parse_feed_bytes(&response.body_raw) {
        Ok(entries) => {
            debug!(entries = entries.len(), "feed parsed");
            Outcome::Complete(entries)
        }
        Err(e) => {
            warn!(error = %e, "feed could not be parsed");
            Outcome::failed(e)
        }
    }
}
