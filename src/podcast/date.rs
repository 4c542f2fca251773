use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts accepted for `publication_date`, tried in order.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Offset-carrying layouts beyond strict RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Parses an episode publication date.
///
/// Values with a `Z` or numeric offset keep that offset. Values without one
/// are taken as UTC, never as local time. A bare `YYYY-MM-DD` is midnight UTC.
///
/// # Examples
///
/// ```
/// use podcast_rss_generator::podcast::parse_publication_date;
///
/// let aware = parse_publication_date("2023-01-15T10:00:00+02:00").unwrap();
/// assert_eq!(aware.offset().local_minus_utc(), 7200);
///
/// let naive = parse_publication_date("2023-01-15T10:00:00").unwrap();
/// assert_eq!(naive.offset().local_minus_utc(), 0);
/// ```
pub fn parse_publication_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Shape check used by the validator.
pub fn is_valid_publication_date(raw: &str) -> bool {
    parse_publication_date(raw).is_some()
}

/// Renders a publication date for `<pubDate>`: RFC 2822 with a numeric offset.
pub fn format_rfc2822(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc2822()
}

/// Converts to UTC for comparisons against the clock.
pub fn to_utc(date: &DateTime<FixedOffset>) -> DateTime<Utc> {
    date.with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_utc_z() {
        let dt = parse_publication_date("2023-01-15T10:00:00Z").unwrap();
        assert_eq!(to_utc(&dt), Utc.with_ymd_and_hms(2023, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_numeric_offset_preserved() {
        let dt = parse_publication_date("2023-01-15T10:00:00-05:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(to_utc(&dt).hour(), 15);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let dt = parse_publication_date("2024-05-31T23:59:59").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(to_utc(&dt), Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_parse_space_separator_and_fraction() {
        assert!(parse_publication_date("2023-01-15 10:00:00").is_some());
        assert!(parse_publication_date("2023-01-15T10:00:00.250").is_some());
        assert!(parse_publication_date("2023-01-15 10:00:00+01:00").is_some());
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_publication_date("2023-01-15").unwrap();
        assert_eq!(to_utc(&dt), Utc.with_ymd_and_hms(2023, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_dates() {
        assert!(!is_valid_publication_date("invalid-date"));
        assert!(!is_valid_publication_date("2023-13-01T10:00:00Z"));
        assert!(!is_valid_publication_date("2023-01-32T10:00:00Z"));
        assert!(!is_valid_publication_date(""));
        assert!(!is_valid_publication_date("   "));
    }

    #[test]
    fn test_rfc2822_rendering() {
        let dt = parse_publication_date("2023-01-15T10:00:00Z").unwrap();
        assert_eq!(format_rfc2822(&dt), "Sun, 15 Jan 2023 10:00:00 +0000");

        let dt = parse_publication_date("2023-01-15T10:00:00+02:00").unwrap();
        assert_eq!(format_rfc2822(&dt), "Sun, 15 Jan 2023 10:00:00 +0200");
    }
}
