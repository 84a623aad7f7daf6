use crate::entities::{NewSource, Source};
use anyhow::Result;
use sqlx::{Pool, Sqlite};

#[derive(Clone)]
pub struct SourceRepository {
    pool: Pool<Sqlite>,
}

impl SourceRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Returns `false` when a source with the same URL already exists.
    pub async fn insert_or_ignore(&self, source: &NewSource) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO sources (name, url, category, trust_score, user_added, filter_topic)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&source.name)
        .bind(&source.url)
        .bind(&source.category)
        .bind(source.trust_score)
        .bind(source.user_added)
        .bind(&source.filter_topic)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_name(&self) -> Result<Vec<Source>> {
        let sources = sqlx::query_as::<_, Source>(
            r#"
            SELECT id, name, url, category, trust_score, user_added, filter_topic
            FROM sources
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sources)
    }

    /// Names are not unique; the oldest row with this name wins.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Source>> {
        let source = sqlx::query_as::<_, Source>(
            r#"
            SELECT id, name, url, category, trust_score, user_added, filter_topic
            FROM sources
            WHERE name = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(source)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<Source>> {
        let source = sqlx::query_as::<_, Source>(
            r#"
            SELECT id, name, url, category, trust_score, user_added, filter_topic
            FROM sources
            WHERE url = ?
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(source)
    }

    /// Articles of the source go with it.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sources WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sources")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
