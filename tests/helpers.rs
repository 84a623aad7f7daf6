#![allow(dead_code)]

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use clearfeed::entities::NewSource;
use clearfeed::repositories;

/// In-memory store with the schema applied. One connection that never
/// expires, so the database lives as long as the pool.
pub async fn memory_pool() -> Pool<Sqlite> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");
    repositories::migrate(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub fn source(name: &str, url: &str, filter_topic: Option<&str>) -> NewSource {
    NewSource {
        name: name.to_string(),
        url: url.to_string(),
        category: "Health".to_string(),
        trust_score: 7.0,
        user_added: true,
        filter_topic: filter_topic.map(str::to_string),
    }
}

/// RSS 2.0 document with one `<item>` per `(title, link, description)`.
pub fn rss_feed(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link, description)| {
            format!(
                "<item><title>{title}</title><link>{link}</link>\
                 <description>{description}</description>\
                 <pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate></item>"
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>Test feed</title>\
         <link>http://example.com</link><description>Test</description>{body}</channel></rss>"
    )
}

/// A readable article page.
pub fn article_page(title: &str, paragraph: &str) -> String {
    format!(
        "<html><head><title>{title}</title>\
         <meta property=\"og:image\" content=\"/img/{title}.jpg\"></head>\
         <body><nav>Home | World | Health</nav><article><h1>{title}</h1>\
         <p>{paragraph}</p><p>{paragraph}</p><p>{paragraph}</p></article></body></html>"
    )
}
