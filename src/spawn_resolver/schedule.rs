use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use log::debug;

use crate::error::TrackerError;

use super::timestamp::localize;

/// One `(weekday, time-of-day)` entry of a weekly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl FromStr for ScheduleSlot {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split_whitespace();

        let (Some(day), Some(time), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(TrackerError::Parse(format!("schedule slot '{value}'")));
        };

        let weekday = Weekday::from_str(day)
            .map_err(|_| TrackerError::Parse(format!("weekday '{day}'")))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| TrackerError::Parse(format!("time of day '{time}'")))?;

        Ok(Self { weekday, time })
    }
}

impl ScheduleSlot {
    /// Next occurrence at or after `now`, in the zone of `now`.
    pub fn next_occurrence<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let tz = now.timezone();
        let today = now.date_naive();
        let days_ahead = (7 + self.weekday.num_days_from_sunday()
            - today.weekday().num_days_from_sunday())
            % 7;

        let candidate = today.checked_add_signed(Duration::days(days_ahead as i64))?;
        let mut occurrence = localize(&tz, &candidate.and_time(self.time))?;

        if occurrence < *now {
            let next_week = candidate.checked_add_signed(Duration::days(7))?;
            occurrence = localize(&tz, &next_week.and_time(self.time))?;
        }

        Some(occurrence.with_timezone(&Utc))
    }
}

/// Comma separated list of slots, e.g. `"Monday 11:30, Thursday 19:00"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub slots: Vec<ScheduleSlot>,
}

impl WeeklySchedule {
    /// Keeps every slot that parses and skips the rest.
    pub fn parse_lenient(value: &str) -> Self {
        let slots = value
            .split(',')
            .map(str::trim)
            .filter(|slot| !slot.is_empty())
            .filter_map(|slot| match slot.parse::<ScheduleSlot>() {
                Ok(slot) => Some(slot),
                Err(err) => {
                    debug!("skipping schedule slot: {}", err);
                    None
                }
            })
            .collect();

        Self { slots }
    }

    pub fn next_spawn<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        self.slots
            .iter()
            .filter_map(|slot| slot.next_occurrence(now))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate};

    use super::*;

    fn at(tz: &FixedOffset, date: (i32, u32, u32), time: (u32, u32)) -> DateTime<FixedOffset> {
        let naive = NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(time.0, time.1, 0)
            .unwrap();
        tz.from_local_datetime(&naive).unwrap()
    }

    #[test]
    fn should_parse_slots() {
        let slot: ScheduleSlot = "monday 11:30".parse().unwrap();
        assert_eq!(slot.weekday, Weekday::Mon);
        assert_eq!(slot.time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());

        let slot: ScheduleSlot = "Thu 7:05".parse().unwrap();
        assert_eq!(slot.weekday, Weekday::Thu);
        assert_eq!(slot.time, NaiveTime::from_hms_opt(7, 5, 0).unwrap());
    }

    #[test]
    fn should_reject_malformed_slots() {
        assert!("Someday 11:30".parse::<ScheduleSlot>().is_err());
        assert!("Monday".parse::<ScheduleSlot>().is_err());
        assert!("Monday 11".parse::<ScheduleSlot>().is_err());
        assert!("Monday 25:00".parse::<ScheduleSlot>().is_err());
        assert!("Monday 11:30 extra".parse::<ScheduleSlot>().is_err());
    }

    #[test]
    fn should_skip_malformed_slots_leniently() {
        let schedule = WeeklySchedule::parse_lenient("Monday 11:30, Funday 10:00, , Friday");
        assert_eq!(schedule.slots.len(), 1);
        assert_eq!(schedule.slots[0].weekday, Weekday::Mon);
    }

    #[test]
    fn should_use_same_day_when_time_not_passed() {
        let tz = FixedOffset::east_opt(0).unwrap();
        // 2024-01-01 is a Monday
        let now = at(&tz, (2024, 1, 1), (10, 0));
        let slot: ScheduleSlot = "Monday 11:30".parse().unwrap();

        assert_eq!(slot.next_occurrence(&now), Some(at(&tz, (2024, 1, 1), (11, 30)).with_timezone(&Utc)));
    }

    #[test]
    fn should_roll_to_next_week_when_time_passed() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = at(&tz, (2024, 1, 1), (12, 0));
        let slot: ScheduleSlot = "Monday 11:30".parse().unwrap();

        assert_eq!(slot.next_occurrence(&now), Some(at(&tz, (2024, 1, 8), (11, 30)).with_timezone(&Utc)));
    }

    #[test]
    fn should_keep_slot_matching_now_exactly() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = at(&tz, (2024, 1, 1), (11, 30));
        let slot: ScheduleSlot = "Monday 11:30".parse().unwrap();

        assert_eq!(slot.next_occurrence(&now), Some(now.with_timezone(&Utc)));
    }

    #[test]
    fn should_evaluate_weekday_in_local_zone() {
        // Sunday 23:00 at UTC-5 is already Monday in UTC
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = at(&tz, (2023, 12, 31), (23, 0));
        let slot: ScheduleSlot = "Monday 01:00".parse().unwrap();

        assert_eq!(slot.next_occurrence(&now), Some(at(&tz, (2024, 1, 1), (1, 0)).with_timezone(&Utc)));
    }

    #[test]
    fn should_move_slot_in_spring_gap_forward() {
        let berlin = chrono_tz::Europe::Berlin;
        // 2024-03-31 is a Sunday, clocks jump from 02:00 to 03:00
        let now = berlin.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let slot: ScheduleSlot = "Sunday 02:30".parse().unwrap();

        let expected = DateTime::parse_from_rfc3339("2024-03-31T03:30:00+02:00").unwrap();
        assert_eq!(slot.next_occurrence(&now), Some(expected.with_timezone(&Utc)));
    }

    #[test]
    fn should_use_first_pass_of_repeated_hour() {
        let berlin = chrono_tz::Europe::Berlin;
        // 2024-10-27 is a Sunday, 02:00 to 03:00 happens twice
        let now = berlin.with_ymd_and_hms(2024, 10, 27, 0, 0, 0).unwrap();
        let slot: ScheduleSlot = "Sunday 02:30".parse().unwrap();

        let expected = DateTime::parse_from_rfc3339("2024-10-27T02:30:00+02:00").unwrap();
        assert_eq!(slot.next_occurrence(&now), Some(expected.with_timezone(&Utc)));
    }

    #[test]
    fn should_pick_soonest_slot() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        // Wednesday
        let now = at(&tz, (2024, 1, 3), (9, 0));
        let schedule = WeeklySchedule::parse_lenient("Monday 11:30, Thursday 19:00, Wednesday 08:00");

        assert_eq!(schedule.next_spawn(&now), Some(at(&tz, (2024, 1, 4), (19, 0)).with_timezone(&Utc)));
    }

    #[test]
    fn should_return_none_without_valid_slots() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = at(&tz, (2024, 1, 3), (9, 0));

        assert_eq!(WeeklySchedule::parse_lenient("Funday 10:00").next_spawn(&now), None);
        assert_eq!(WeeklySchedule::parse_lenient("").next_spawn(&now), None);
    }
}
