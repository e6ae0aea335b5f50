//! Display formatting for observation and dataset timestamps.
//!
//! Parsing is fail-soft: an unparsable value is shown verbatim on cards and
//! omitted from the footer, it never raises.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const UNKNOWN_DATE: &str = "Unknown date";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses the timestamp shapes the scraper emits. Naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Long form for popup cards, e.g. `May 1, 2024, 10:00 AM`.
pub fn format_card(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return UNKNOWN_DATE.to_string();
    };

    match parse_timestamp(raw) {
        Some(dt) => dt.format("%B %-d, %Y, %I:%M %p").to_string(),
        None => raw.to_string(),
    }
}

/// Short form with zone for the footer, e.g. `May 1, 2024, 10:00 AM UTC`.
///
/// Returns `None` when the value is absent or unparsable; the footer is left
/// untouched in both cases.
pub fn format_footer(raw: Option<&str>) -> Option<String> {
    let dt = parse_timestamp(raw?)?;
    Some(dt.format("%b %-d, %Y, %I:%M %p UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_date_is_unknown() {
        assert_eq!(format_card(None), "Unknown date");
        assert_eq!(format_card(Some("")), "Unknown date");
        assert_eq!(format_card(Some("   ")), "Unknown date");
    }

    #[test]
    fn test_unparsable_date_is_returned_verbatim() {
        assert_eq!(format_card(Some("not-a-date")), "not-a-date");
        assert_eq!(format_card(Some("2024-13-45")), "2024-13-45");
    }

    #[test]
    fn test_card_format() {
        assert_eq!(
            format_card(Some("2024-05-01T10:00:00Z")),
            "May 1, 2024, 10:00 AM"
        );
        assert_eq!(format_card(Some("2024-05-01 09:05")), "May 1, 2024, 09:05 AM");
        assert_eq!(format_card(Some("2024-12-24 18:30")), "December 24, 2024, 06:30 PM");
    }

    #[test]
    fn test_offsets_are_converted_to_utc() {
        assert_eq!(
            format_card(Some("2024-05-01T10:00:00-04:00")),
            "May 1, 2024, 02:00 PM"
        );
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(format_card(Some("2024-05-01")), "May 1, 2024, 12:00 AM");
    }

    #[test]
    fn test_footer_format() {
        assert_eq!(
            format_footer(Some("2024-05-01T10:00:00.123456")).as_deref(),
            Some("May 1, 2024, 10:00 AM UTC")
        );
        assert_eq!(format_footer(None), None);
        assert_eq!(format_footer(Some("yesterday")), None);
    }
}
