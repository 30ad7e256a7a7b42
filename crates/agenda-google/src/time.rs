// RFC 3339 formatting for the Calendar API.
//
// Google accepts plenty of shapes but we always send
// YYYY-MM-DDTHH:MM:SS.sssZ in UTC, millisecond precision.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp the way the Calendar API expects it
pub fn to_rfc3339_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a client-supplied ISO 8601 timestamp into UTC.
///
/// Naive timestamps (no offset) are taken as UTC; bare dates resolve to
/// midnight UTC. Returns None when the input cannot be parsed at all.
pub fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Fall back to a naive timestamp without offset
    if let Ok(naive) = raw.parse::<chrono::NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    // Bare date (YYYY-MM-DD)
    raw.parse::<chrono::NaiveDate>()
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_rfc3339_millis() {
        let dt = Utc.with_ymd_and_hms(2025, 8, 20, 18, 0, 0).unwrap();
        assert_eq!(to_rfc3339_millis(dt), "2025-08-20T18:00:00.000Z");
    }

    #[test]
    fn test_parse_with_offset() {
        let dt = parse_iso8601("2025-08-20T21:00:00+03:00").unwrap();
        assert_eq!(to_rfc3339_millis(dt), "2025-08-20T18:00:00.000Z");
    }

    #[test]
    fn test_parse_naive_assumes_utc() {
        let dt = parse_iso8601("2025-08-20T18:00:00").unwrap();
        assert_eq!(to_rfc3339_millis(dt), "2025-08-20T18:00:00.000Z");
    }

    #[test]
    fn test_parse_date_only_is_midnight_utc() {
        let dt = parse_iso8601("2025-08-20").unwrap();
        assert_eq!(to_rfc3339_millis(dt), "2025-08-20T00:00:00.000Z");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_iso8601("next tuesday").is_none());
    }
}
