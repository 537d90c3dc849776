//! Date normalization
//!
//! Extraction scripts hand back whatever the page renders: JavaScript
//! `Date.toString()` output with `GMT+HHMM` offsets and zone names in
//! parentheses, ISO strings, RFC 2822 headers. Everything is parsed
//! permissively and re-emitted as an ISO-8601 UTC instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Sentinel for a date the page does not provide
pub const INDEFINITE: &str = "Indefinite";

/// Prefix of the marker stored in place of an unparsable date
pub const DATE_ERROR_PREFIX: &str = "Error: ";

/// A date string that matched none of the known formats
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse date {raw:?}: {cause}")]
pub struct DateParseError {
    pub raw: String,
    pub cause: String,
}

static PAREN_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]+\)").unwrap());

static GMT_OFFSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"GMT([+-]\d)").unwrap());

static TRAILING_ZONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?:GMT|UTC)$").unwrap());

static WEEKDAY_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap()
});

/// Formats carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &[
    "%b %d %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%b %d, %Y %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Formats without an offset, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats, read as midnight UTC
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%m/%d/%Y",
];

/// Strip zone names, weekday names and `GMT` prefixes the parser cannot use
pub fn clean_date_string(raw: &str) -> String {
    let cleaned = PAREN_SUFFIX_REGEX.replace_all(raw.trim(), "");
    let cleaned = GMT_OFFSET_REGEX.replace_all(&cleaned, "${1}");
    let cleaned = TRAILING_ZONE_REGEX.replace(&cleaned, " +0000");
    WEEKDAY_PREFIX_REGEX
        .replace(cleaned.trim(), "")
        .trim()
        .to_string()
}

/// Parse a heterogeneous date-time string into a UTC instant
pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>, DateParseError> {
    let cleaned = clean_date_string(raw);
    if cleaned.is_empty() {
        return Err(DateParseError {
            raw: raw.to_string(),
            cause: "empty input".to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&cleaned, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Ok(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }

    Err(DateParseError {
        raw: raw.to_string(),
        cause: format!("unrecognized date format {cleaned:?}"),
    })
}

/// ISO-8601 with an explicit `+00:00` offset
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parse and re-emit as ISO-8601 UTC
pub fn to_utc_iso(raw: &str) -> Result<String, DateParseError> {
    parse_utc(raw).map(|dt| format_utc(&dt))
}

/// Value stored for an extracted date field.
///
/// Missing or blank input yields [`INDEFINITE`]; a parse failure yields an
/// `"Error: ..."` marker. Neither is a usable timestamp.
pub fn date_field(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => INDEFINITE.to_string(),
        Some(raw) => match to_utc_iso(raw) {
            Ok(iso) => iso,
            Err(e) => format!("{DATE_ERROR_PREFIX}{e}"),
        },
    }
}

/// True when a stored date field holds an actual timestamp
pub fn is_known_date(value: &str) -> bool {
    value != INDEFINITE && !value.starts_with(DATE_ERROR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_date_with_gmt_offset() {
        let iso = to_utc_iso("Thu Jan 1 2024 12:00:00 GMT+0530 (India Standard Time)").unwrap();
        assert_eq!(iso, "2024-01-01T06:30:00+00:00");
    }

    #[test]
    fn test_negative_gmt_offset_crosses_midnight() {
        let iso =
            to_utc_iso("Mon Mar 04 2024 23:30:00 GMT-0800 (Pacific Standard Time)").unwrap();
        assert_eq!(iso, "2024-03-05T07:30:00+00:00");
    }

    #[test]
    fn test_iso_inputs() {
        assert_eq!(
            to_utc_iso("2024-06-30T23:59:00.000Z").unwrap(),
            "2024-06-30T23:59:00+00:00"
        );
        assert_eq!(
            to_utc_iso("2024-05-01T10:15:30.250+02:00").unwrap(),
            "2024-05-01T08:15:30.250+00:00"
        );
        assert_eq!(
            to_utc_iso("2024-05-01 10:15:30").unwrap(),
            "2024-05-01T10:15:30+00:00"
        );
    }

    #[test]
    fn test_rfc2822_and_bare_gmt() {
        assert_eq!(
            to_utc_iso("Tue, 02 Jan 2024 08:00:00 GMT").unwrap(),
            "2024-01-02T08:00:00+00:00"
        );
    }

    #[test]
    fn test_date_only() {
        assert_eq!(
            to_utc_iso("Mar 15, 2025").unwrap(),
            "2025-03-15T00:00:00+00:00"
        );
    }

    #[test]
    fn test_garbage_reports_raw_input() {
        let err = to_utc_iso("next tuesday-ish").unwrap_err();
        assert_eq!(err.raw, "next tuesday-ish");
        assert!(to_utc_iso("   ").is_err());
    }

    #[test]
    fn test_date_field_sentinels() {
        assert_eq!(date_field(None), INDEFINITE);
        assert_eq!(date_field(Some("  ")), INDEFINITE);

        let marker = date_field(Some("not a date"));
        assert!(marker.starts_with(DATE_ERROR_PREFIX));
        assert!(!is_known_date(&marker));
        assert!(!is_known_date(INDEFINITE));

        let value = date_field(Some("2024-01-01T00:00:00Z"));
        assert_eq!(value, "2024-01-01T00:00:00+00:00");
        assert!(is_known_date(&value));
    }
}
