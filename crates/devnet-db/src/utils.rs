//! Shared utility functions

use chrono::{DateTime, SecondsFormat, Utc};

/// Parse a datetime string (RFC3339 format) or return current time
///
/// Stored timestamps are always written by [`format_timestamp`], so the
/// fallback only triggers on rows edited by hand.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Format a timestamp for storage
///
/// Fixed microsecond precision keeps the text lexicographically sortable,
/// which the `ORDER BY date` queries rely on.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Generate a new opaque record identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let b = a + chrono::Duration::microseconds(1500);

        assert_eq!(format_timestamp(&a), "2024-01-01T12:00:00.000000Z");
        assert_eq!(format_timestamp(&b), "2024-01-01T12:00:00.001500Z");
        assert!(format_timestamp(&a) < format_timestamp(&b));
    }

    #[test]
    fn test_parse_datetime_or_now() {
        let valid_time = "2024-01-01T12:00:00Z";
        let parsed = parse_datetime_or_now(valid_time);
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        // Round trip through the storage format
        let stored = format_timestamp(&parsed);
        assert_eq!(parse_datetime_or_now(&stored), parsed);

        // Invalid time should return current time (just check it doesn't panic)
        let now_before = Utc::now();
        let parsed = parse_datetime_or_now("invalid");
        let now_after = Utc::now();
        assert!(parsed >= now_before && parsed <= now_after);
    }

    #[test]
    fn test_new_id_is_unique() {
        let a = new_id();
        let b = new_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
