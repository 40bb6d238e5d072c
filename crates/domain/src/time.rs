//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

/// UTC timestamp used for `last_changed`, `last_updated`, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse a timestamp that carries no offset and is known to be in UTC.
///
/// Accepts RFC 3339 strings too, in which case the offset is honoured.
/// Fractional seconds are optional.
#[must_use]
pub fn parse_utc(text: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.to_utc());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_parse_naive_timestamp_as_utc() {
        let ts = parse_utc("2024-01-10T12:34:56").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 10, 12, 34, 56).unwrap());
    }

    #[test]
    fn should_parse_fractional_seconds() {
        let ts = parse_utc("2024-01-10T12:34:56.25").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn should_honour_rfc3339_offset() {
        let ts = parse_utc("2024-01-10T13:34:56+01:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 10, 12, 34, 56).unwrap());
    }

    #[test]
    fn should_reject_garbage() {
        assert!(parse_utc("yesterday").is_none());
    }
}
