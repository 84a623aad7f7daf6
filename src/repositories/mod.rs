pub mod articles;
pub mod seed;
pub mod settings;
pub mod sources;

pub use articles::ArticleRepository;
pub use seed::{import_seed, load_all_sources, read_seed_file};
pub use settings::SettingsRepository;
pub use sources::SourceRepository;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Open the store, creating the database file when it does not exist yet.
pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Runs all pending migrations; no-op if up-to-date.
pub async fn migrate(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
