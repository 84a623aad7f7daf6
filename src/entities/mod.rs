use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// --- Tables ---

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub url: String, // UNIQUE, natural dedup key
    pub category: String,
    pub trust_score: f64, // placeholder score, 7.0 for scouted feeds
    pub user_added: bool,
    pub filter_topic: Option<String>, // set on group-fallback sources
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Article {
    pub id: i64,
    pub source_id: i64, // FK -> sources.id
    pub title: String,
    pub url: String, // UNIQUE
    pub image_url: Option<String>,
    pub published_at: String, // UTC, YYYY-MM-DDTHH:MM:SSZ
    pub raw_text: String,
    pub summary: String,
    pub language: String,
    pub tags: String, // comma-joined
}

/// --- Views ---

/// Article row joined with the name of its source, as listed in the feed.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct FeedItem {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub summary: String,
    pub published_at: String,
    pub language: String,
    pub source_name: String,
}

/// --- Inserts ---

/// A source that has not been stored yet. Produced by vetting, manual entry
/// and the seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSource {
    pub name: String,
    pub url: String,
    pub category: String,
    pub trust_score: f64,
    #[serde(default)]
    pub user_added: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_topic: Option<String>,
}

impl From<Source> for NewSource {
    fn from(source: Source) -> Self {
        Self {
            name: source.name,
            url: source.url,
            category: source.category,
            trust_score: source.trust_score,
            user_added: source.user_added,
            filter_topic: source.filter_topic,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub source_id: i64,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: String,
    pub raw_text: String,
    pub summary: String,
    pub language: String,
    pub tags: String,
}
