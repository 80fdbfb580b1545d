use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::constants::DATETIME_LOCAL_FORMAT;

const LOCAL_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

// zone-qualified values without seconds, which RFC 3339 does not allow
const ZONED_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%z", "%Y-%m-%d %H:%M%z"];

/// Parses a stored timestamp.
///
/// Zone-qualified RFC 3339 values are taken as-is. Values without zone
/// information are wall-clock times in `tz`. A bare date is UTC midnight.
pub fn parse_timestamp<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&value.replacen(' ', "T", 1)) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(parsed) = parse_zoned_without_seconds(value) {
        return Some(parsed);
    }

    if let Some(naive) = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return localize(tz, &naive).map(|local| local.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_zoned_without_seconds(value: &str) -> Option<DateTime<Utc>> {
    let value = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(rest) => format!("{rest}+00:00"),
        None => value.to_string(),
    };

    ZONED_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&value, format).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Maps a wall-clock time onto `tz`. Ambiguous times take the earlier
/// instant, times inside a forward gap are pushed one hour later.
pub fn localize<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(value) => Some(value),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(*naive + Duration::hours(1)))
            .earliest(),
    }
}

/// Renders an instant as a `datetime-local` input value in `tz`.
pub fn to_datetime_local<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant
        .with_timezone(tz)
        .format(DATETIME_LOCAL_FORMAT)
        .to_string()
}

/// Converts any stored timestamp into the `YYYY-MM-DDTHH:MM` input format.
/// Values already in that shape are returned untouched, unparseable values
/// become empty.
pub fn to_datetime_local_input<Tz: TimeZone>(stored: Option<&str>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(stored) = stored.filter(|value| !value.is_empty()) else {
        return String::new();
    };

    if is_datetime_local(stored) {
        return stored.to_string();
    }

    parse_timestamp(stored, tz)
        .map(|instant| to_datetime_local(&instant, tz))
        .unwrap_or_default()
}

fn is_datetime_local(value: &str) -> bool {
    value.len() == 16 && NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_FORMAT).is_ok()
}
