//! Timestamp parsing and canonicalization.
//!
//! Every source declares the chrono layout its pages use; this module turns
//! those heterogeneous inputs into one canonical, timezone-naive string that
//! the store and the delivery queue agree on. The canonical format is
//! `DD-MM-YYYY HH:MM:SS`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// The canonical timestamp format stored in the `posted` column.
pub const CANONICAL_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Parse a raw timestamp under a source-declared layout and render it in the
/// canonical format.
///
/// Layouts that carry a UTC offset (`%z` / `%:z`) are parsed as offset-aware
/// and then stripped to their wall-clock time, so `2024-03-01T10:00:00+03:00`
/// canonicalizes to `01-03-2024 10:00:00`. Date-only layouts get a midnight
/// time component.
///
/// # Arguments
///
/// * `src` - The raw value read from the page (attribute or regex capture)
/// * `layout` - The chrono format string declared in the source catalog
///
/// # Returns
///
/// The canonical string, or `None` if `src` does not parse under `layout`.
pub fn to_canonical(src: &str, layout: &str) -> Option<String> {
    parse_with_layout(src, layout).map(|t| t.format(CANONICAL_FORMAT).to_string())
}

/// Parse a timestamp already in the canonical format.
pub fn parse_canonical(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT).ok()
}

/// Parse `src` under `layout` into a naive datetime.
///
/// Tries, in order: offset-aware datetime (when the layout mentions an
/// offset), naive datetime, and bare date (midnight).
fn parse_with_layout(src: &str, layout: &str) -> Option<NaiveDateTime> {
    if layout.contains("%z") || layout.contains("%:z") || layout.contains("%#z") {
        if let Ok(t) = DateTime::parse_from_str(src, layout) {
            return Some(t.naive_local());
        }
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(src, layout) {
        return Some(t);
    }
    NaiveDate::parse_from_str(src, layout).ok()?.and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_layout_keeps_wall_clock() {
        let got = to_canonical("2024-03-01T10:15:30+03:00", "%Y-%m-%dT%H:%M:%S%:z");
        assert_eq!(got.as_deref(), Some("01-03-2024 10:15:30"));
    }

    #[test]
    fn test_naive_layout() {
        let got = to_canonical("2024-03-01 10:15:30", "%Y-%m-%d %H:%M:%S");
        assert_eq!(got.as_deref(), Some("01-03-2024 10:15:30"));
    }

    #[test]
    fn test_date_only_layout_gets_midnight() {
        let got = to_canonical("01.03.2024", "%d.%m.%Y");
        assert_eq!(got.as_deref(), Some("01-03-2024 00:00:00"));
    }

    #[test]
    fn test_garbage_input_yields_none() {
        assert_eq!(to_canonical("yesterday", "%Y-%m-%d %H:%M:%S"), None);
        assert_eq!(to_canonical("", "%Y-%m-%d %H:%M:%S"), None);
    }

    #[test]
    fn test_parse_canonical_round_trip() {
        let t = parse_canonical("01-03-2024 10:15:30").unwrap();
        assert_eq!(t.format(CANONICAL_FORMAT).to_string(), "01-03-2024 10:15:30");
    }

    #[test]
    fn test_parse_canonical_rejects_other_formats() {
        assert!(parse_canonical("2024-03-01 10:15:30").is_none());
        assert!(parse_canonical("").is_none());
    }
}
