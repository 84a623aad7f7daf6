use crate::fetcher::{
    errors::FetchError,
    pipeline::process_response,
    types::{ContentKind, PageResponse},
};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, header};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "Clearfeed/0.1";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("Failed to build HTTP client")
});

pub fn get_client() -> &'static Client {
    &HTTP_CLIENT
}

/// Fetch an HTML page.
pub async fn fetch(url: &str) -> Result<PageResponse, FetchError> {
    fetch_as(url, ContentKind::Html).await
}

#[instrument(skip_all, fields(url = %url, kind = ?kind))]
pub async fn fetch_as(url: &str, kind: ContentKind) -> Result<PageResponse, FetchError> {
    let parsed_url = url::Url::parse(url)?;

    let response = HTTP_CLIENT
        .get(parsed_url)
        .header(header::ACCEPT, kind.accept_header())
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let final_url = response.url().clone();
    let status = response.status();
    let headers = response.headers().clone();

    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !kind.accepts(&content_type) {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    let body_bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Io(e.to_string()))?;

    // Content-Length may be missing or wrong
    if body_bytes.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
    }

    debug!(status = %status, bytes = body_bytes.len(), content_type = %content_type, "fetched");
    process_response(final_url, status, headers, body_bytes, content_type)
}
