use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Earliest instant a simulated date may point at.
const MIN_TIMESTAMP: i64 = 60;

const DATE_TIME_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses a simulated date.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (UTC), `YYYY-MM-DD` (midnight UTC) or a
/// UNIX timestamp. Results before `1970-01-01T00:01:00Z` are clamped to it. Blank or
/// unparsable input yields `None`.
#[must_use]
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(input)
        .map(|date| date.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
        .or_else(|| input.parse::<i64>().ok().and_then(|ts| DateTime::from_timestamp(ts, 0)))?;

    if parsed.timestamp() < MIN_TIMESTAMP {
        return DateTime::from_timestamp(MIN_TIMESTAMP, 0);
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(input: &str) -> Option<i64> {
        parse_date(input).map(|date| date.timestamp())
    }

    #[test]
    fn accepted_formats() {
        assert_eq!(ts("2030-01-01T12:00:00+02:00"), Some(1_893_492_000));
        assert_eq!(ts("2030-01-01 10:00"), Some(1_893_492_000));
        assert_eq!(ts("2030-01-01T10:00:00"), Some(1_893_492_000));
        assert_eq!(ts("2030-01-01"), Some(1_893_456_000));
        assert_eq!(ts(" 1893456000 "), Some(1_893_456_000));
    }

    #[test]
    fn early_dates_are_clamped() {
        assert_eq!(ts("0"), Some(60));
        assert_eq!(ts("1970-01-01"), Some(60));
        assert_eq!(ts("-500"), Some(60));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(ts(""), None);
        assert_eq!(ts("tomorrow"), None);
        assert_eq!(ts("2030-13-01"), None);
    }
}
