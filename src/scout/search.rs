use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::{Config, ENV_SERPAPI_KEY};
use crate::fetcher::get_client;
use crate::outcome::Outcome;
use crate::scout::error::ScoutError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ordered result links for `query`, at most `max_results` of them.
    async fn search(&self, query: &str, max_results: usize) -> Outcome<Vec<String>>;
}

/// Google results through SerpApi.
#[derive(Debug, Clone)]
pub struct SerpApiSearch {
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    link: Option<String>,
}

impl SerpApiSearch {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ScoutError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ScoutError::MissingCredential(ENV_SERPAPI_KEY))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        Self::new(
            config.serpapi_base_url(),
            config.serpapi_key().map(str::to_string),
        )
    }

    async fn request(&self, query: &str, max_results: usize) -> Result<SearchResponse, String> {
        let num = max_results.to_string();
        let response = get_client()
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body: SearchResponse = response.json().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(body
                .error
                .unwrap_or_else(|| format!("search returned {status}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl SearchProvider for SerpApiSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Outcome<Vec<String>> {
        let body = match self.request(query, max_results).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "search failed");
                return Outcome::failed(e);
            }
        };

        if let Some(message) = &body.error {
            // "no results" arrives as a 200 with an error message
            debug!(message = %message, "search reported");
        }

        let links: Vec<String> = body
            .organic_results
            .into_iter()
            .filter_map(|r| r.link)
            .filter(|l| !l.is_empty())
            .take(max_results)
            .collect();
        debug!(count = links.len(), "search results");
        Outcome::Complete(links)
    }
}
