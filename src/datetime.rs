//! Timestamp normalization for stored articles.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Canonical stored form: second precision, UTC, `Z` suffix.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Naive layouts tried after RFC 2822; all are taken to be UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%d %H:%M:%S"];

pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.format(ISO_FORMAT).to_string()
}

/// Parse the timestamp shapes feeds actually use.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Normalize to [`ISO_FORMAT`], substituting the current time when the
/// input is absent or unparseable.
pub fn normalize_timestamp(raw: Option<&str>) -> String {
    normalize_timestamp_at(raw, Utc::now())
}

pub fn normalize_timestamp_at(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let parsed = raw.and_then(parse_timestamp);
    format_iso(&parsed.unwrap_or(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc2822_gmt() {
        assert_eq!(
            normalize_timestamp(Some("Mon, 01 Jan 2024 10:00:00 GMT")),
            "2024-01-01T10:00:00Z"
        );
    }

    #[test]
    fn rfc2822_offset_is_converted_to_utc() {
        assert_eq!(
            normalize_timestamp(Some("Mon, 01 Jan 2024 10:00:00 +0200")),
            "2024-01-01T08:00:00Z"
        );
    }

    #[test]
    fn iso_and_sqlite_layouts() {
        assert_eq!(
            normalize_timestamp(Some("2024-03-05T07:08:09Z")),
            "2024-03-05T07:08:09Z"
        );
        assert_eq!(
            normalize_timestamp(Some("2024-03-05 07:08:09")),
            "2024-03-05T07:08:09Z"
        );
        assert_eq!(normalize_timestamp(Some("2024-03-05")), "2024-03-05T00:00:00Z");
    }

    #[test]
    fn rfc3339_with_fraction_and_offset() {
        assert_eq!(
            normalize_timestamp(Some("2024-03-05T07:08:09.123-05:00")),
            "2024-03-05T12:08:09Z"
        );
    }

    #[test]
    fn empty_or_garbage_falls_back_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        assert_eq!(normalize_timestamp_at(None, now), "2025-06-01T12:30:00Z");
        assert_eq!(normalize_timestamp_at(Some(""), now), "2025-06-01T12:30:00Z");
        assert_eq!(
            normalize_timestamp_at(Some("yesterday-ish"), now),
            "2025-06-01T12:30:00Z"
        );
    }

    #[test]
    fn fallback_is_close_to_current_time() {
        let normalized = normalize_timestamp(Some("not a date"));
        let parsed = NaiveDateTime::parse_from_str(&normalized, ISO_FORMAT)
            .unwrap()
            .and_utc();
        assert!((Utc::now() - parsed).num_seconds().abs() < 5);
    }
}
