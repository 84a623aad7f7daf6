use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link};
use scraper::Html;
use serde::Serialize;

use crate::datetime::{format_iso, parse_timestamp};
use crate::feeds::raw_dates::{RAW_FIELDS, RawTimestamp, scan_raw_timestamps};

/// One normalized feed item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Plain-text summary, HTML removed.
    pub summary: String,
    /// Category terms attached to the item.
    pub tags: Vec<String>,
    /// Thumbnail or image enclosure advertised by the feed.
    pub image_url: Option<String>,
    /// ISO-8601 UTC when a structured field resolved, otherwise the first
    /// non-empty raw string. Empty when the item carries no date at all.
    pub published: String,
    /// Field that produced `published`.
    pub published_field: Option<&'static str>,
    /// Every raw date field found on the item, for debugging.
    pub published_raw: Vec<RawTimestamp>,
}

/// Parse a feed document into entries.
pub fn parse_feed_bytes(bytes: &[u8]) -> Result<Vec<FeedEntry>, feed_rs::parser::ParseFeedError> {
    let feed = feed_rs::parser::parse(bytes)?;
    let raw = scan_raw_timestamps(&String::from_utf8_lossy(bytes));

    Ok(feed
        .entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let raw_fields = raw.get(i).cloned().unwrap_or_default();
            build_entry(entry, raw_fields)
        })
        .collect())
}

fn build_entry(entry: Entry, raw_fields: Vec<RawTimestamp>) -> FeedEntry {
    let (published_field, published) = resolve_published(entry.published, entry.updated, &raw_fields)
        .map(|(field, value)| (Some(field), value))
        .unwrap_or((None, String::new()));

    let summary = entry
        .summary
        .as_ref()
        .map(|t| t.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .map(|html| strip_html(&html))
        .unwrap_or_default();

    FeedEntry {
        title: entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default(),
        link: entry_link(&entry.links, &entry.id),
        summary,
        tags: entry
            .categories
            .iter()
            .map(|c| c.label.clone().unwrap_or_else(|| c.term.clone()))
            .filter(|t| !t.trim().is_empty())
            .collect(),
        image_url: entry_image(&entry),
        published,
        published_field,
        published_raw: raw_fields,
    }
}

/// Structured fields first (published, updated, issued, created), then the
/// raw strings in [`RAW_FIELDS`] order, whatever their document order.
fn resolve_published(
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    raw_fields: &[RawTimestamp],
) -> Option<(&'static str, String)> {
    let raw_value = |field: &str| {
        raw_fields
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.value.as_str())
    };

    let structured = [
        ("published_parsed", published),
        ("updated_parsed", updated),
        ("issued_parsed", raw_value("issued").and_then(parse_timestamp)),
        ("created_parsed", raw_value("created").and_then(parse_timestamp)),
    ];
    if let Some((field, dt)) = structured
        .into_iter()
        .find_map(|(field, dt)| dt.map(|dt| (field, dt)))
    {
        return Some((field, format_iso(&dt)));
    }

    RAW_FIELDS.iter().find_map(|&field| {
        raw_value(field)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| (field, v.to_string()))
    })
}

fn entry_link(links: &[Link], id: &str) -> String {
    let preferred = links.iter().find(|l| {
        let rel = l.rel.as_deref().unwrap_or("");
        !l.href.trim().is_empty() && (rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
    });
    if let Some(link) = preferred.or_else(|| links.iter().find(|l| !l.href.trim().is_empty())) {
        return link.href.trim().to_string();
    }
    if id.starts_with("http://") || id.starts_with("https://") {
        return id.to_string();
    }
    String::new()
}

fn entry_image(entry: &Entry) -> Option<String> {
    let thumbnail = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.to_string())
        .find(|uri| !uri.is_empty());

    thumbnail.or_else(|| {
        entry
            .media
            .iter()
            .flat_map(|m| m.content.iter())
            .filter(|c| {
                c.content_type
                    .as_ref()
                    .is_some_and(|ct| ct.to_string().starts_with("image/"))
            })
            .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
    })
}

pub(crate) fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
