use std::error::Error as _;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("dns failure: {0}")]
    Dns(String),

    #[error("tls error: {0}")]
    Tls(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

/// Fragments that identify certificate/handshake failures in the reqwest
/// error chain.
const TLS_MARKERS: &[&str] = &["certificate", "tls", "ssl", "handshake"];

impl FetchError {
    /// Connection-level failures: the host could not be resolved or reached,
    /// or the TLS session could not be established.
    pub fn is_connection_issue(&self) -> bool {
        matches!(
            self,
            Self::Dns(_) | Self::Tls(_) | Self::ConnectTimeout | Self::InvalidUrl(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout | Self::RequestTimeout)
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        let chain = error_chain(&err);

        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if TLS_MARKERS.iter().any(|m| chain.to_lowercase().contains(m)) {
            Self::Tls(chain)
        } else if err.is_connect() || err.is_request() {
            Self::Dns(chain)
        } else if err.is_body() || err.is_decode() {
            Self::Io(chain)
        } else {
            Self::Unknown(chain)
        }
    }
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
