mod derivation;
mod schedule;
mod timestamp;

pub use derivation::*;
pub use schedule::*;
pub use timestamp::*;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{BossRecord, ResolvedBoss, StoredBoss};

/// Effective next spawn of a record.
///
/// A weekly schedule wins whenever the record has no usable kill interval,
/// even if a stale `next_spawn_at` is stored. Otherwise the stored
/// timestamp is used. Anything unparseable resolves to `None`.
pub fn resolve<Tz: TimeZone>(record: &BossRecord, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    if let Some(schedule) = record.schedule() {
        if record.interval_hours().is_none() {
            return WeeklySchedule::parse_lenient(schedule).next_spawn(now);
        }
    }

    record
        .next_spawn_at
        .as_deref()
        .and_then(|value| parse_timestamp(value, &now.timezone()))
}

pub fn resolve_all<Tz: TimeZone>(bosses: Vec<StoredBoss>, now: &DateTime<Tz>) -> Vec<ResolvedBoss> {
    bosses
        .into_iter()
        .map(|StoredBoss { key, record }| {
            let spawn_instant = resolve(&record, now);
            ResolvedBoss { key, record, spawn_instant }
        })
        .collect()
}
