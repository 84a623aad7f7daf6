//! Orchestration of the scout, fetch, summarize and store steps.

use anyhow::Result;
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::datetime::normalize_timestamp;
use crate::entities::{FeedItem, NewArticle, NewSource, Source};
use crate::extractor::language::DEFAULT_LANGUAGE;
use crate::ingest::{ArticleFetcher, ArticleRecord};
use crate::repositories::{ArticleRepository, SourceRepository};
use crate::scout::Scout;
use crate::summarizer::Summarizer;
use crate::topics;
use crate::translator::{Language, Translator};

/// Sources found for a batch of topics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoutSummary {
    /// Unique by URL, first topic wins.
    pub sources: Vec<NewSource>,
    /// Topics whose search failed, with the cause.
    pub degraded: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub fetched: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub missing_source: usize,
    pub failed: usize,
    pub placeholder_summaries: usize,
}

pub struct Pipeline {
    sources: SourceRepository,
    articles: ArticleRepository,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            sources: SourceRepository::new(pool.clone()),
            articles: ArticleRepository::new(pool),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn sources(&self) -> &SourceRepository {
        &self.sources
    }

    pub fn articles(&self) -> &ArticleRepository {
        &self.articles
    }

    /// Scout every topic, falling back to its catalog group.
    pub async fn scout_topics(&self, scout: &Scout, topic_names: &[String]) -> ScoutSummary {
        let mut summary = ScoutSummary::default();
        let mut seen = HashSet::new();

        for topic in topic_names {
            if self.cancel.is_cancelled() {
                debug!("cancelled");
                break;
            }

            let group = topics::group_for(topic);
            info!(topic = %topic, group = ?group, "scouting");
            let outcome = scout.scout_and_vet(topic, group).await;
            if let Some(cause) = outcome.cause() {
                summary.degraded.push((topic.clone(), cause.to_string()));
            }

            for source in outcome.into_value() {
                if seen.insert(source.url.clone()) {
                    summary.sources.push(source);
                }
            }
        }

        info!(sources = summary.sources.len(), "scouting finished");
        summary
    }

    /// Store scouted sources as user-added. Returns how many were new.
    pub async fn save_vetted(&self, vetted: &[NewSource]) -> Result<usize> {
        let mut added = 0;
        for source in vetted {
            let source = NewSource {
                user_added: true,
                ..source.clone()
            };
            match self.sources.insert_or_ignore(&source).await {
                Ok(true) => added += 1,
                Ok(false) => debug!(url = %source.url, "source already stored"),
                Err(e) => warn!(name = %source.name, error = %e, "could not save source"),
            }
        }
        info!(added, total = vetted.len(), "saved vetted sources");
        Ok(added)
    }

    /// Stored sources, optionally restricted to `names`.
    pub async fn select_sources(&self, names: &[String]) -> Result<Vec<Source>> {
        let all = self.sources.list_by_name().await?;
        if names.is_empty() {
            return Ok(all);
        }
        Ok(all.into_iter().filter(|s| names.contains(&s.name)).collect())
    }

    /// Fetch from the chosen stored sources, then summarize and store.
    pub async fn fetch_and_ingest(
        &self,
        fetcher: &ArticleFetcher,
        summarizer: &dyn Summarizer,
        names: &[String],
        max_articles: usize,
    ) -> Result<IngestReport> {
        let chosen = self.select_sources(names).await?;
        if chosen.is_empty() {
            warn!("no sources to fetch from");
            return Ok(IngestReport::default());
        }

        let records = fetcher.fetch_articles(&chosen, max_articles).await;
        self.ingest(summarizer, records).await
    }

    /// Summarize each record and store it under the source it came from.
    ///
    /// A record whose source is no longer stored is dropped before it is
    /// summarized. A failed summary is stored as its placeholder text. Store
    /// errors on one record do not stop the others.
    ///
    /// Records are attributed by source name to the oldest matching row, so
    /// two stored sources sharing a name (two feeds of one domain) pool their
    /// articles under the first one.
    pub async fn ingest(
        &self,
        summarizer: &dyn Summarizer,
        records: Vec<ArticleRecord>,
    ) -> Result<IngestReport> {
        let mut report = IngestReport {
            fetched: records.len(),
            ..IngestReport::default()
        };

        for record in records {
            if self.cancel.is_cancelled() {
                info!("cancelled, keeping stored articles");
                break;
            }

            let Some(source) = self.sources.find_by_name(&record.source_name).await? else {
                warn!(source = %record.source_name, title = %record.title, "source not found for article");
                report.missing_source += 1;
                continue;
            };

            let summary = summarizer.summarize(&record.raw_text).await;
            if summary.is_degraded() {
                report.placeholder_summaries += 1;
            }

            let article = NewArticle {
                source_id: source.id,
                title: record.title,
                url: record.url,
                image_url: record.image_url.filter(|u| !u.is_empty()),
                published_at: normalize_timestamp(record.published.as_deref()),
                raw_text: record.raw_text,
                summary: summary.into_value(),
                language: record
                    .language
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
                tags: record.tags.join(","),
            };

            match self.articles.insert_or_ignore(&article).await {
                Ok(true) => report.stored += 1,
                Ok(false) => {
                    debug!(url = %article.url, "duplicate article ignored");
                    report.duplicates += 1;
                }
                Err(e) => {
                    warn!(url = %article.url, error = %e, "could not save article");
                    report.failed += 1;
                }
            }
        }

        info!(
            fetched = report.fetched,
            stored = report.stored,
            duplicates = report.duplicates,
            missing_source = report.missing_source,
            placeholder_summaries = report.placeholder_summaries,
            "ingest finished"
        );
        Ok(report)
    }

    /// Feed listing, with summaries translated when a translator is given.
    pub async fn feed(
        &self,
        limit: i64,
        language: Option<&str>,
        translation: Option<(&dyn Translator, Language)>,
    ) -> Result<Vec<FeedItem>> {
        let mut items = self.articles.list_feed(limit, language).await?;
        if let Some((translator, target)) = translation {
            for item in &mut items {
                item.summary = translator.translate(&item.summary, target).await.into_value();
            }
        }
        Ok(items)
    }

    /// Delete every stored article.
    pub async fn reset(&self) -> Result<u64> {
        let deleted = self.articles.delete_all().await?;
        info!(deleted, "feed reset");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use crate::repositories::test_support::memory_pool;
    use crate::scout::discovery::MockFeedFinder;
    use crate::scout::search::MockSearchProvider;
    use crate::summarizer::{MockSummarizer, placeholder};
    use crate::translator::MockTranslator;
    use std::sync::Arc;

    fn new_source(name: &str, url: &str) -> NewSource {
        NewSource {
            name: name.to_string(),
            url: url.to_string(),
            category: "Health".to_string(),
            trust_score: 7.0,
            user_added: false,
            filter_topic: None,
        }
    }

    fn record(source_name: &str, url: &str) -> ArticleRecord {
        ArticleRecord {
            title: format!("Title {url}"),
            url: url.to_string(),
            source_name: source_name.to_string(),
            raw_text: "text".to_string(),
            published: Some("Mon, 01 Jan 2024 10:00:00 GMT".to_string()),
            tags: vec!["health".to_string(), "diabetes".to_string()],
            ..ArticleRecord::default()
        }
    }

    async fn pipeline_with_source() -> Pipeline {
        let pipeline = Pipeline::new(memory_pool().await);
        pipeline
            .save_vetted(&[new_source("a.com", "https://a.com/rss")])
            .await
            .unwrap();
        pipeline
    }

    #[tokio::test]
    async fn failed_summary_is_stored_as_placeholder() {
        let pipeline = pipeline_with_source().await;
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Outcome::degraded(placeholder(&"rate limited"), "rate limited"));

        let report = pipeline
            .ingest(&summarizer, vec![record("a.com", "https://a.com/1")])
            .await
            .unwrap();
        assert_eq!(report.stored, 1);
        assert_eq!(report.placeholder_summaries, 1);

        let feed = pipeline.feed(50, None, None).await.unwrap();
        assert_eq!(feed[0].summary, "[Summary unavailable: rate limited]");
        assert_eq!(feed[0].published_at, "2024-01-01T10:00:00Z");
        assert_eq!(feed[0].language, "en");
    }

    #[tokio::test]
    async fn duplicates_and_unknown_sources_are_counted() {
        let pipeline = pipeline_with_source().await;
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Outcome::Complete("short".to_string()));

        let report = pipeline
            .ingest(
                &summarizer,
                vec![
                    record("a.com", "https://a.com/1"),
                    record("a.com", "https://a.com/1"),
                    record("gone.example", "https://gone.example/1"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            report,
            IngestReport {
                fetched: 3,
                stored: 1,
                duplicates: 1,
                missing_source: 1,
                failed: 0,
                placeholder_summaries: 0,
            }
        );
        assert_eq!(pipeline.articles().count_by_url("https://a.com/1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn records_without_source_are_not_summarized() {
        let pipeline = pipeline_with_source().await;
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().never();

        let report = pipeline
            .ingest(&summarizer, vec![record("gone.example", "https://gone.example/1")])
            .await
            .unwrap();

        assert_eq!(report.missing_source, 1);
        assert_eq!(report.stored, 0);
        assert_eq!(pipeline.articles().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn shared_name_attributes_to_oldest_source() {
        let pipeline = Pipeline::new(memory_pool().await);
        pipeline
            .save_vetted(&[
                new_source("a.com", "https://a.com/rss"),
                new_source("a.com", "https://a.com/world/rss"),
            ])
            .await
            .unwrap();
        let first = pipeline.sources().find_by_url("https://a.com/rss").await.unwrap().unwrap();
        let second = pipeline
            .sources()
            .find_by_url("https://a.com/world/rss")
            .await
            .unwrap()
            .unwrap();

        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Outcome::Complete("short".to_string()));
        pipeline
            .ingest(&summarizer, vec![record("a.com", "https://a.com/world/1")])
            .await
            .unwrap();

        pipeline.sources().delete(second.id).await.unwrap();
        assert_eq!(pipeline.articles().count().await.unwrap(), 1);
        pipeline.sources().delete(first.id).await.unwrap();
        assert_eq!(pipeline.articles().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn saved_sources_are_user_added() {
        let pipeline = pipeline_with_source().await;
        let stored = pipeline.sources().find_by_name("a.com").await.unwrap().unwrap();
        assert!(stored.user_added);

        let again = pipeline
            .save_vetted(&[new_source("a.com", "https://a.com/rss")])
            .await
            .unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn select_sources_by_name() {
        let pipeline = pipeline_with_source().await;
        pipeline
            .save_vetted(&[new_source("b.com", "https://b.com/rss")])
            .await
            .unwrap();

        assert_eq!(pipeline.select_sources(&[]).await.unwrap().len(), 2);
        let chosen = pipeline.select_sources(&["b.com".to_string()]).await.unwrap();
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].url, "https://b.com/rss");
    }

    #[tokio::test]
    async fn scouted_topics_are_deduplicated_by_url() {
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .returning(|_, _| Outcome::Complete(vec!["https://shared.example.com".to_string()]));
        let mut finder = MockFeedFinder::new();
        finder
            .expect_find_feeds()
            .returning(|url| Ok(vec![format!("{url}/rss")]));
        let scout = Scout::new(Arc::new(search), Arc::new(finder));

        let pipeline = Pipeline::new(memory_pool().await);
        let summary = pipeline
            .scout_topics(&scout, &["Diabetes".to_string(), "Cancer".to_string()])
            .await;

        assert_eq!(summary.sources.len(), 1);
        assert_eq!(summary.sources[0].category, "Diabetes");
        assert!(summary.degraded.is_empty());
    }

    #[tokio::test]
    async fn feed_translation_falls_back_to_original() {
        let pipeline = pipeline_with_source().await;
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Outcome::Complete("Good news".to_string()));
        pipeline
            .ingest(&summarizer, vec![record("a.com", "https://a.com/1")])
            .await
            .unwrap();

        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|text, _| Outcome::degraded(text.to_string(), "503"));

        let feed = pipeline
            .feed(50, None, Some((&translator as &dyn Translator, Language::Spanish)))
            .await
            .unwrap();
        assert_eq!(feed[0].summary, "Good news");
    }

    #[tokio::test]
    async fn reset_empties_feed() {
        let pipeline = pipeline_with_source().await;
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Outcome::Complete("s".to_string()));
        pipeline
            .ingest(&summarizer, vec![record("a.com", "https://a.com/1")])
            .await
            .unwrap();

        assert_eq!(pipeline.reset().await.unwrap(), 1);
        assert!(pipeline.feed(50, None, None).await.unwrap().is_empty());
    }
}
