//! Lenient date and datetime parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use tidyload_model::Value;

const DATETIME_FORMATS: [&str; 15] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
    // Month-first before day-first for ambiguous slashed dates.
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: [&str; 13] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y-%b-%d",
];

/// Parse a date or datetime string into a naive timestamp.
///
/// Offsets in RFC 3339 input are folded into UTC. Plain dates resolve to
/// midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in &DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    for fmt in &DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    None
}

/// Timestamp view of a cell: timestamps as-is, text parsed leniently.
pub fn value_to_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(ts) => Some(*ts),
        Value::Str(text) | Value::Category(text) => parse_datetime(text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_iso_forms() {
        assert_eq!(
            parse_datetime("2024-01-15T10:30:00"),
            Some(ymd_hms(2024, 1, 15, 10, 30, 0))
        );
        assert_eq!(
            parse_datetime("2024-01-15 10:30"),
            Some(ymd_hms(2024, 1, 15, 10, 30, 0))
        );
        assert_eq!(
            parse_datetime("2024-01-15"),
            Some(ymd_hms(2024, 1, 15, 0, 0, 0))
        );
    }

    #[test]
    fn folds_offsets_into_utc() {
        assert_eq!(
            parse_datetime("2024-01-15T10:30:00+02:00"),
            Some(ymd_hms(2024, 1, 15, 8, 30, 0))
        );
    }

    #[test]
    fn slashed_dates_are_month_first() {
        assert_eq!(
            parse_datetime("03/04/2024"),
            Some(ymd_hms(2024, 3, 4, 0, 0, 0))
        );
        assert_eq!(
            parse_datetime("25/04/2024"),
            Some(ymd_hms(2024, 4, 25, 0, 0, 0))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("2024-13-45"), None);
    }

    #[test]
    fn value_view() {
        let ts = ymd_hms(2023, 6, 1, 0, 0, 0);
        assert_eq!(value_to_timestamp(&Value::Timestamp(ts)), Some(ts));
        assert_eq!(value_to_timestamp(&Value::str("2023-06-01")), Some(ts));
        assert_eq!(value_to_timestamp(&Value::Int(5)), None);
        assert_eq!(value_to_timestamp(&Value::Null), None);
    }
}
