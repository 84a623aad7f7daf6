use bytes::Bytes;
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::fs;
use url::Url;

use crate::extractor::extract_page;
use crate::fetcher::types::{Charset, PageResponse};

#[test]
fn test_extract_article() {
    let html = fs::read_to_string("src/extractor/tests/fixtures/article.html")
        .expect("Failed to read test fixture");

    let response = create_test_response(html, "https://healthwire.example.com/insulin");
    let content = extract_page(&response).expect("article should be extracted");

    assert!(content.title.contains("Insulin Prices Fall Sharply"));
    assert_eq!(content.site_name, Some("Health Wire".to_string()));
    assert!(content.text.contains("seventy percent"));
    assert!(content.text.contains("pharmacy benefit"));
    assert!(!content.text.contains("window.analytics"));
    assert_eq!(
        content.top_image,
        Some("https://healthwire.example.com/images/insulin.jpg".to_string())
    );
    assert_eq!(content.language, Some("en".to_string()));
}

#[test]
fn test_empty_page_yields_nothing() {
    let html = fs::read_to_string("src/extractor/tests/fixtures/empty.html")
        .expect("Failed to read test fixture");

    let response = create_test_response(html, "https://example.com/empty");
    assert!(extract_page(&response).is_none());
}

#[test]
fn test_malformed_html() {
    let html =
        "<html><head><title>Broken</title><body><p>Unclosed tags<div>More content".to_string();

    let response = create_test_response(html, "https://example.com/broken");

    if let Some(content) = extract_page(&response) {
        assert!(content.text.contains("Unclosed tags") || content.text.contains("More content"));
    }
}

fn create_test_response(html: String, url: &str) -> PageResponse {
    PageResponse {
        url_final: Url::parse(url).unwrap(),
        status: StatusCode::OK,
        headers: HeaderMap::new(),
        content_type: "text/html; charset=utf-8".to_string(),
        body_raw: Bytes::from(html.clone()),
        body_utf8: html,
        charset: Charset::Utf8,
        fetched_at: Utc::now(),
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(
            html in ".*",
            url in "https://[a-z]+\\.com/[a-z]*"
        ) {
            let response = create_test_response(html, &url);
            let _ = extract_page(&response);
        }
    }
}
