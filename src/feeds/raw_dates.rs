use quick_xml::{Reader, events::Event};
use serde::Serialize;

/// Date-bearing elements in the order they are consulted.
pub const RAW_FIELDS: &[&str] = &["published", "updated", "pubDate", "date", "issued", "created"];

/// A timestamp string exactly as it appeared in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTimestamp {
    pub field: &'static str,
    pub value: String,
}

fn raw_field(local_name: &[u8]) -> Option<&'static str> {
    RAW_FIELDS
        .iter()
        .copied()
        .find(|field| field.as_bytes() == local_name)
}

fn record(fields: &mut Vec<RawTimestamp>, field: &'static str, bytes: &[u8]) {
    let value = String::from_utf8_lossy(bytes).trim().to_string();
    if value.is_empty() || fields.iter().any(|f| f.field == field) {
        return;
    }
    fields.push(RawTimestamp { field, value });
}

/// Collect the raw date fields of every `<item>`/`<entry>`, in document
/// order. Entries are aligned by index with the structured parse.
///
/// Parsing stops quietly at the first XML error; whatever was collected
/// up to that point is returned.
pub fn scan_raw_timestamps(xml: &str) -> Vec<Vec<RawTimestamp>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<Vec<RawTimestamp>> = None;
    let mut depth = 0usize;
    let mut capture: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                if current.is_some() {
                    depth += 1;
                    capture = raw_field(name.as_ref());
                } else if matches!(name.as_ref(), b"item" | b"entry") {
                    current = Some(Vec::new());
                    depth = 0;
                }
            }
            Ok(Event::Empty(e)) => {
                // a self-closing item is still an entry to feed parsers
                if current.is_none() && matches!(e.local_name().as_ref(), b"item" | b"entry") {
                    entries.push(Vec::new());
                }
            }
            Ok(Event::Text(text)) => {
                if let (Some(field), Some(fields)) = (capture, current.as_mut()) {
                    record(fields, field, &text);
                }
            }
            Ok(Event::CData(text)) => {
                if let (Some(field), Some(fields)) = (capture, current.as_mut()) {
                    record(fields, field, &text);
                }
            }
            Ok(Event::End(_)) => {
                capture = None;
                if current.is_some() {
                    if depth == 0 {
                        entries.extend(current.take());
                    } else {
                        depth -= 1;
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_rss_and_dublin_core_dates() {
        let xml = r#"<?xml version="1.0"?>
            <rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
              <channel>
                <pubDate>Sun, 31 Dec 2023 00:00:00 GMT</pubDate>
                <item><title>A</title><pubDate>Mon, 01 Jan 2024 10:00:00 GMT</pubDate></item>
                <item><title>B</title><dc:date>2024-01-02</dc:date></item>
                <item><title>C</title></item>
              </channel>
            </rss>"#;

        let entries = scan_raw_timestamps(xml);
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            vec![RawTimestamp {
                field: "pubDate",
                value: "Mon, 01 Jan 2024 10:00:00 GMT".to_string()
            }]
        );
        assert_eq!(entries[1][0].field, "date");
        assert!(entries[2].is_empty());
    }

    #[test]
    fn self_closing_entries_are_counted() {
        let xml = r#"<rss><channel>
              <item/>
              <item><title>B</title><pubDate>last tuesday</pubDate></item>
              <entry/>
            </channel></rss>"#;

        let entries = scan_raw_timestamps(xml);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_empty());
        assert_eq!(entries[1][0].value, "last tuesday");
        assert!(entries[2].is_empty());
    }

    #[test]
    fn first_occurrence_per_field_wins() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
              <updated>2023-12-31T00:00:00Z</updated>
              <entry>
                <updated>2024-01-01T10:00:00Z</updated>
                <source><updated>2020-01-01T00:00:00Z</updated></source>
                <published>bogus</published>
              </entry>
            </feed>"#;

        let entries = scan_raw_timestamps(xml);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].len(), 2);
        assert_eq!(entries[0][0].value, "2024-01-01T10:00:00Z");
        assert_eq!(entries[0][1].field, "published");
    }
}
