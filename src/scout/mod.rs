//! Find feeds for a topic: web search, feed autodiscovery, vetting.

pub mod discovery;
pub mod error;
pub mod search;
pub mod vetting;

pub use discovery::{DiscoveryLimits, DiscoveryReport, FeedFinder, HttpFeedFinder, discover_feeds};
pub use error::ScoutError;
pub use search::{SearchProvider, SerpApiSearch};
pub use vetting::vet_and_format_feeds;

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::Config;
use crate::entities::NewSource;
use crate::outcome::Outcome;

/// Caps for one scouting attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoutLimits {
    pub results: usize,
    pub discovery: DiscoveryLimits,
}

/// Narrow topics get the generous caps.
pub const TOPIC_LIMITS: ScoutLimits = ScoutLimits {
    results: 10,
    discovery: DiscoveryLimits {
        max_feeds: 10,
        per_site: 10,
        timeout: Duration::from_secs(20),
    },
};

/// The group fallback is a quick second look.
pub const GROUP_LIMITS: ScoutLimits = ScoutLimits {
    results: 3,
    discovery: DiscoveryLimits {
        max_feeds: 3,
        per_site: 3,
        timeout: Duration::from_secs(10),
    },
};

pub fn search_query(topic: &str) -> String {
    format!("{topic} news rss feed")
}

pub struct Scout {
    search: Arc<dyn SearchProvider>,
    finder: Arc<dyn FeedFinder>,
}

impl Scout {
    pub fn new(search: Arc<dyn SearchProvider>, finder: Arc<dyn FeedFinder>) -> Self {
        Self { search, finder }
    }

    /// SerpApi search plus HTTP autodiscovery. Fails when the search key is
    /// missing.
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let search = SerpApiSearch::from_config(config)?;
        Ok(Self::new(Arc::new(search), Arc::new(HttpFeedFinder)))
    }

    /// Vetted sources for `topic`. When the topic itself turns up nothing and
    /// a `group` is given, the group is scouted with smaller caps and its
    /// sources are marked to filter their articles by `topic`.
    ///
    /// An empty `Complete` means nothing was found; an empty `Degraded` means
    /// the search service failed.
    #[instrument(skip(self))]
    pub async fn scout_and_vet(&self, topic: &str, group: Option<&str>) -> Outcome<Vec<NewSource>> {
        let narrow = self.attempt(topic, TOPIC_LIMITS).await;
        if !narrow.value().is_empty() {
            return narrow;
        }

        let Some(group) = group else {
            info!("no feeds for topic and no group to fall back to");
            return narrow;
        };

        info!(group, "no feeds for topic, trying group feeds with topic filter");
        let fallback = self.attempt(group, GROUP_LIMITS).await.map(|sources| {
            sources
                .into_iter()
                .map(|mut s| {
                    s.filter_topic = Some(topic.to_string());
                    s
                })
                .collect::<Vec<_>>()
        });

        match (&narrow, &fallback) {
            (Outcome::Degraded { cause, .. }, Outcome::Complete(v)) if v.is_empty() => {
                Outcome::failed(cause)
            }
            _ => fallback,
        }
    }

    /// Search, discover and vet once. Sources are categorized under `query`.
    async fn attempt(&self, query: &str, limits: ScoutLimits) -> Outcome<Vec<NewSource>> {
        let candidates = self.search.search(&search_query(query), limits.results).await;
        let degraded_cause = candidates.cause().map(str::to_string);
        let candidates = candidates.into_value();

        let sources = if candidates.is_empty() {
            Vec::new()
        } else {
            let report =
                discover_feeds(Arc::clone(&self.finder), &candidates, limits.discovery).await;
            vet_and_format_feeds(&report.feeds, query)
        };

        match degraded_cause {
            Some(cause) => Outcome::degraded(sources, cause),
            None => Outcome::Complete(sources),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scout::discovery::MockFeedFinder;
    use crate::scout::search::MockSearchProvider;
    use mockall::predicate::eq;

    fn finder_returning_rss() -> MockFeedFinder {
        let mut finder = MockFeedFinder::new();
        finder
            .expect_find_feeds()
            .returning(|url| Ok(vec![format!("{url}/rss")]));
        finder
    }

    #[tokio::test]
    async fn topic_sources_use_topic_category() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .with(eq("Diabetes news rss feed"), eq(10))
            .times(1)
            .returning(|_, _| Outcome::Complete(vec!["https://diabetes.example.org".to_string()]));

        let scout = Scout::new(Arc::new(search), Arc::new(finder_returning_rss()));
        let outcome = scout.scout_and_vet("Diabetes", Some("Health")).await;

        assert!(!outcome.is_degraded());
        let sources = outcome.into_value();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://diabetes.example.org/rss");
        assert_eq!(sources[0].category, "Diabetes");
        assert_eq!(sources[0].filter_topic, None);
    }

    #[tokio::test]
    async fn falls_back_to_group_with_filter() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .with(eq("Lupus news rss feed"), eq(10))
            .times(1)
            .returning(|_, _| Outcome::Complete(Vec::new()));
        search
            .expect_search()
            .with(eq("Health news rss feed"), eq(3))
            .times(1)
            .returning(|_, _| Outcome::Complete(vec!["https://health.example.com".to_string()]));

        let scout = Scout::new(Arc::new(search), Arc::new(finder_returning_rss()));
        let sources = scout.scout_and_vet("Lupus", Some("Health")).await.into_value();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].category, "Health");
        assert_eq!(sources[0].filter_topic.as_deref(), Some("Lupus"));
    }

    #[tokio::test]
    async fn nothing_found_without_group_is_empty_complete() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .times(1)
            .returning(|_, _| Outcome::Complete(Vec::new()));

        let scout = Scout::new(Arc::new(search), Arc::new(MockFeedFinder::new()));
        let outcome = scout.scout_and_vet("Knitting", None).await;

        assert_eq!(outcome, Outcome::Complete(Vec::new()));
    }

    #[tokio::test]
    async fn failed_search_is_degraded() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .times(2)
            .returning(|_, _| Outcome::failed("503 Service Unavailable"));

        let scout = Scout::new(Arc::new(search), Arc::new(MockFeedFinder::new()));
        let outcome = scout.scout_and_vet("Tennis", Some("Sports")).await;

        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }
}
