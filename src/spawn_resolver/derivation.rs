use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};

use crate::models::parse_interval_hours;

use super::timestamp::{parse_timestamp, to_datetime_local};

fn hours_to_duration(hours: f64) -> Option<Duration> {
    let millis = (hours * 3_600_000.0).round();

    if !millis.is_finite() || millis > i64::MAX as f64 {
        return None;
    }

    Duration::try_milliseconds(millis as i64)
}

/// `last_killed + interval_hours`, rendered as a local `datetime-local`
/// value. Returns `None` when either input is unusable so the caller can
/// leave its fields alone.
pub fn derive_next_spawn<Tz: TimeZone>(last_killed: &str, interval_hours: &str, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let hours = parse_interval_hours(interval_hours)?;
    let killed_at = parse_timestamp(last_killed, tz)?;
    let next_spawn = killed_at.checked_add_signed(hours_to_duration(hours)?)?;

    Some(to_datetime_local(&next_spawn, tz))
}

/// Fields written when a boss is marked as killed right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetFields {
    pub last_killed_at: String,
    pub next_spawn_at: String,
}

pub fn reset_fields(now: DateTime<Utc>, interval_hours: f64) -> Option<ResetFields> {
    if !interval_hours.is_finite() || interval_hours <= 0.0 {
        return None;
    }

    let next_spawn = now.checked_add_signed(hours_to_duration(interval_hours)?)?;

    Some(ResetFields {
        last_killed_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        next_spawn_at: next_spawn.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn should_add_interval_to_last_kill() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();

        assert_eq!(
            derive_next_spawn("2024-01-01T10:00", "6", &tz).as_deref(),
            Some("2024-01-01T16:00")
        );
        assert_eq!(
            derive_next_spawn("2024-01-01T22:30", "1.5", &tz).as_deref(),
            Some("2024-01-02T00:00")
        );
    }

    #[test]
    fn should_convert_zoned_last_kill_to_local() {
        let tz = FixedOffset::east_opt(3600).unwrap();

        assert_eq!(
            derive_next_spawn("2024-01-01T10:00:00.000Z", "2", &tz).as_deref(),
            Some("2024-01-01T13:00")
        );
    }

    #[test]
    fn should_not_derive_from_unusable_inputs() {
        let tz = FixedOffset::east_opt(0).unwrap();

        assert_eq!(derive_next_spawn("2024-01-01T10:00", "0", &tz), None);
        assert_eq!(derive_next_spawn("2024-01-01T10:00", "six", &tz), None);
        assert_eq!(derive_next_spawn("2024-01-01T10:00", "", &tz), None);
        assert_eq!(derive_next_spawn("", "6", &tz), None);
        assert_eq!(derive_next_spawn("yesterday", "6", &tz), None);
    }

    #[test]
    fn should_build_reset_fields() {
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let fields = reset_fields(now, 12.0).unwrap();

        assert_eq!(fields.last_killed_at, "2024-05-01T12:00:00.000Z");
        assert_eq!(fields.next_spawn_at, "2024-05-02T00:00:00.000Z");
    }

    #[test]
    fn should_not_reset_without_interval() {
        let now = Utc::now();

        assert_eq!(reset_fields(now, 0.0), None);
        assert_eq!(reset_fields(now, -1.0), None);
        assert_eq!(reset_fields(now, f64::NAN), None);
    }
}
