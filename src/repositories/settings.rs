use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};

const SELECTED_TOPICS_KEY: &str = "selected_topics";

/// Keyed JSON values. Only the topic selection lives here for now.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Sqlite>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Empty when nothing was saved yet or the stored value is unreadable.
    pub async fn selected_topics(&self) -> Result<Vec<String>> {
        let Some(raw) = self.get(SELECTED_TOPICS_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(topics) => Ok(topics),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable topic selection");
                Ok(Vec::new())
            }
        }
    }

    pub async fn save_selected_topics(&self, topics: &[String]) -> Result<()> {
        let value = serde_json::to_string(topics).context("serializing topic selection")?;
        self.put(SELECTED_TOPICS_KEY, &value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::memory_pool;

    #[tokio::test]
    async fn empty_until_saved() {
        let repo = SettingsRepository::new(memory_pool().await);
        assert!(repo.selected_topics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_replaces_selection() {
        let repo = SettingsRepository::new(memory_pool().await);

        repo.save_selected_topics(&["Diabetes".to_string(), "Tennis".to_string()])
            .await
            .unwrap();
        repo.save_selected_topics(&["Cancer".to_string()]).await.unwrap();

        assert_eq!(repo.selected_topics().await.unwrap(), vec!["Cancer"]);
    }

    #[tokio::test]
    async fn unreadable_value_is_empty() {
        let repo = SettingsRepository::new(memory_pool().await);
        repo.put(SELECTED_TOPICS_KEY, "not json").await.unwrap();
        assert!(repo.selected_topics().await.unwrap().is_empty());
    }
}
