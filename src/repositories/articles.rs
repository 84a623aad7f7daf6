use crate::entities::{FeedItem, NewArticle};
use anyhow::Result;
use sqlx::{Pool, Sqlite};

/// Default page size of the feed listing.
pub const FEED_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct ArticleRepository {
    pool: Pool<Sqlite>,
}

impl ArticleRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Returns `false` when an article with the same URL is already stored.
    pub async fn insert_or_ignore(&self, article: &NewArticle) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO articles
                  (source_id, title, url, image_url, published_at, raw_text, summary, language, tags)
            VALUES (?,         ?,     ?,   ?,         ?,            ?,        ?,       ?,        ?)
            "#,
        )
        .bind(article.source_id)
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.image_url)
        .bind(&article.published_at)
        .bind(&article.raw_text)
        .bind(&article.summary)
        .bind(&article.language)
        .bind(&article.tags)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Feed reset. Returns the number of deleted rows.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Newest first, ties broken by insertion order.
    pub async fn list_feed(&self, limit: i64, language: Option<&str>) -> Result<Vec<FeedItem>> {
        let items = sqlx::query_as::<_, FeedItem>(
            r#"
            SELECT a.id, a.title, a.url, a.image_url, a.summary, a.published_at, a.language,
                   s.name AS source_name
            FROM articles a
            JOIN sources s ON a.source_id = s.id
            WHERE (?1 IS NULL OR a.language = ?1)
            ORDER BY a.published_at DESC, a.id DESC
            LIMIT ?2
            "#,
        )
        .bind(language)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_by_url(&self, url: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
