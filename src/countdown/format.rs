use chrono::{DateTime, TimeZone, Utc};

use crate::constants::SPAWN_DISPLAY_FORMAT;

/// `HH:MM:SS`, hours are not wrapped at a day.
pub fn format_remaining(remaining_seconds: i64) -> String {
    let seconds = remaining_seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn format_spawn_display<Tz: TimeZone>(spawn_instant: Option<&DateTime<Utc>>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    spawn_instant
        .map(|instant| instant.with_timezone(tz).format(SPAWN_DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn should_format_remaining() {
        assert_eq!(format_remaining(0), "00:00:00");
        assert_eq!(format_remaining(59), "00:00:59");
        assert_eq!(format_remaining(3661), "01:01:01");
        assert_eq!(format_remaining(30 * 3600), "30:00:00");
    }

    #[test]
    fn should_format_spawn_display() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let instant = DateTime::parse_from_rfc3339("2024-01-01T10:00:05Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(format_spawn_display(Some(&instant), &tz), "2024-01-01 11:00:05");
        assert_eq!(format_spawn_display(None, &tz), "--");
    }
}
