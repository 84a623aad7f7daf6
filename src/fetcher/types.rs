use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, header::HeaderMap};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    Utf8,
    Windows1252,
    ShiftJis,
    Gbk,
    Big5,
    Other(String),
}

impl Charset {
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Self {
        use std::ptr;

        if ptr::eq(encoding, encoding_rs::UTF_8) {
            Self::Utf8
        } else if ptr::eq(encoding, encoding_rs::WINDOWS_1252) {
            Self::Windows1252
        } else if ptr::eq(encoding, encoding_rs::SHIFT_JIS) {
            Self::ShiftJis
        } else if ptr::eq(encoding, encoding_rs::GBK) || ptr::eq(encoding, encoding_rs::GB18030) {
            Self::Gbk
        } else if ptr::eq(encoding, encoding_rs::BIG5) {
            Self::Big5
        } else {
            Self::Other(encoding.name().to_string())
        }
    }

    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::Windows1252 => encoding_rs::WINDOWS_1252,
            Self::ShiftJis => encoding_rs::SHIFT_JIS,
            Self::Gbk => encoding_rs::GBK,
            Self::Big5 => encoding_rs::BIG5,
            Self::Other(name) => {
                encoding_rs::Encoding::for_label(name.as_bytes()).unwrap_or(encoding_rs::UTF_8)
            }
        }
    }
}

/// What a caller is prepared to receive from a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// An HTML article page.
    Html,
    /// An RSS/Atom/RDF document. Servers routinely mislabel feeds, so any
    /// textual type is accepted.
    Feed,
    /// Anything textual: used when probing pages that may be either.
    Any,
}

impl ContentKind {
    pub fn accepts(&self, content_type: &str) -> bool {
        let ct = content_type.to_ascii_lowercase();
        let is_html = ct.contains("text/html") || ct.contains("application/xhtml");
        let is_xml = ["xml", "rss", "atom", "rdf"].iter().any(|k| ct.contains(k));
        let is_text = ct.starts_with("text/");

        match self {
            Self::Html => is_html,
            Self::Feed => is_xml || is_text,
            Self::Any => is_html || is_xml || is_text || ct.contains("json"),
        }
    }

    pub fn accept_header(&self) -> &'static str {
        match self {
            Self::Html => "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            Self::Feed => {
                "application/rss+xml,application/atom+xml,application/rdf+xml,application/xml;q=0.9,text/xml;q=0.9,*/*;q=0.5"
            }
            Self::Any => "text/html,application/xhtml+xml,application/xml,text/xml;q=0.9,*/*;q=0.8",
        }
    }
}

#[derive(Debug)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub content_type: String,
    pub body_raw: Bytes,
    pub body_utf8: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_kind_rejects_feeds() {
        assert!(ContentKind::Html.accepts("text/html; charset=utf-8"));
        assert!(!ContentKind::Html.accepts("application/rss+xml"));
        assert!(!ContentKind::Html.accepts("image/jpeg"));
    }

    #[test]
    fn feed_kind_tolerates_mislabelled_feeds() {
        assert!(ContentKind::Feed.accepts("application/rss+xml"));
        assert!(ContentKind::Feed.accepts("application/atom+xml; charset=utf-8"));
        assert!(ContentKind::Feed.accepts("text/html"));
        assert!(!ContentKind::Feed.accepts("image/png"));
    }

    #[test]
    fn other_charset_keeps_encoding_name() {
        let charset = Charset::from_encoding(encoding_rs::KOI8_R);
        assert_eq!(charset, Charset::Other("KOI8-R".to_string()));
        assert!(std::ptr::eq(charset.encoding(), encoding_rs::KOI8_R));
    }
}
