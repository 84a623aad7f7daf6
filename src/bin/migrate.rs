use clearfeed::{config::Config, repositories};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let pool = repositories::connect(config.database_url()).await?;

    // runs all pending migrations; no-op if up-to-date
    repositories::migrate(&pool).await?;
    tracing::info!(database = config.database_url(), "migrations applied");

    Ok(())
}
