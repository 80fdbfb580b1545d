mod format;

pub use format::*;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{IMMINENT_WINDOW_MS, SPAWNING_NOW_WINDOW_MS};
use crate::models::ResolvedBoss;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Upcoming,
    Imminent,
    SpawningNow,
    Passed,
    Unknown,
}

impl Tier {
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Upcoming => "#007bff",
            Tier::Imminent => "#ff9900",
            Tier::SpawningNow => "red",
            Tier::Passed => "#777",
            Tier::Unknown => "#888",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownState {
    pub remaining_seconds: Option<i64>,
    pub tier: Tier,
}

impl CountdownState {
    pub fn label(&self) -> String {
        match (self.tier, self.remaining_seconds) {
            (Tier::Upcoming | Tier::Imminent, Some(seconds)) => format_remaining(seconds),
            (Tier::SpawningNow, _) => "SPAWNING NOW!".to_string(),
            (Tier::Passed, _) => "Spawn Passed".to_string(),
            _ => "--:--:--".to_string(),
        }
    }
}

/// Countdown for a spawn instant at `now`. Pure: the tier is derived from the
/// clock difference alone, so resuming after a long pause needs no history.
pub fn countdown(spawn_instant: Option<&DateTime<Utc>>, now: &DateTime<Utc>) -> CountdownState {
    let Some(spawn_instant) = spawn_instant else {
        return CountdownState { remaining_seconds: None, tier: Tier::Unknown };
    };

    let diff_ms = spawn_instant.signed_duration_since(*now).num_milliseconds();

    let tier = if diff_ms > IMMINENT_WINDOW_MS {
        Tier::Upcoming
    } else if diff_ms > 0 {
        Tier::Imminent
    } else if diff_ms > -SPAWNING_NOW_WINDOW_MS {
        Tier::SpawningNow
    } else {
        Tier::Passed
    };

    CountdownState {
        remaining_seconds: Some(diff_ms.div_euclid(1000)),
        tier,
    }
}

/// Sorted snapshot of resolved bosses.
///
/// The order is fixed when a snapshot is loaded; ticking never reorders.
#[derive(Debug, Default, Clone)]
pub struct CountdownEngine {
    sorted: Vec<ResolvedBoss>,
}

impl CountdownEngine {
    pub fn new(resolved: Vec<ResolvedBoss>) -> Self {
        let mut engine = Self::default();
        engine.load(resolved);
        engine
    }

    pub fn load(&mut self, mut resolved: Vec<ResolvedBoss>) {
        // sort_by is stable, equal instants keep store order
        resolved.sort_by(|left, right| match (&left.spawn_instant, &right.spawn_instant) {
            (Some(left), Some(right)) => left.cmp(right),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        self.sorted = resolved;
    }

    pub fn sorted_view(&self) -> &[ResolvedBoss] {
        &self.sorted
    }

    pub fn into_sorted(self) -> Vec<ResolvedBoss> {
        self.sorted
    }

    pub fn tick(resolved: &ResolvedBoss, now: &DateTime<Utc>) -> CountdownState {
        countdown(resolved.spawn_instant.as_ref(), now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::models::BossRecord;

    use super::*;

    fn resolved(key: &str, spawn_instant: Option<DateTime<Utc>>) -> ResolvedBoss {
        ResolvedBoss {
            key: key.into(),
            record: BossRecord::default(),
            spawn_instant,
        }
    }

    fn keys(engine: &CountdownEngine) -> Vec<&str> {
        engine.sorted_view().iter().map(|boss| boss.key.as_str()).collect()
    }

    #[test]
    fn should_sort_ascending_with_unknown_last() {
        let now = Utc::now();
        let engine = CountdownEngine::new(vec![
            resolved("unknown", None),
            resolved("hour", Some(now + Duration::seconds(3600))),
            resolved("minute", Some(now + Duration::seconds(60))),
        ]);

        assert_eq!(keys(&engine), vec!["minute", "hour", "unknown"]);
    }

    #[test]
    fn should_keep_store_order_for_ties() {
        let now = Utc::now();
        let engine = CountdownEngine::new(vec![
            resolved("u1", None),
            resolved("b", Some(now)),
            resolved("u2", None),
            resolved("a", Some(now)),
        ]);

        assert_eq!(keys(&engine), vec!["b", "a", "u1", "u2"]);
    }

    #[test]
    fn should_derive_tiers_at_boundaries() {
        let now = Utc::now();
        let at = |seconds: i64| countdown(Some(&(now + Duration::seconds(seconds))), &now);

        assert_eq!(at(601).tier, Tier::Upcoming);
        assert_eq!(at(600).tier, Tier::Imminent);
        assert_eq!(at(1).tier, Tier::Imminent);
        assert_eq!(at(0).tier, Tier::SpawningNow);
        assert_eq!(at(-299).tier, Tier::SpawningNow);
        assert_eq!(at(-300).tier, Tier::Passed);
        assert_eq!(at(-86_400).tier, Tier::Passed);
        assert_eq!(countdown(None, &now).tier, Tier::Unknown);
    }

    #[test]
    fn should_label_each_tier() {
        let now = Utc::now();
        let at = |seconds: i64| countdown(Some(&(now + Duration::seconds(seconds))), &now);

        assert_eq!(at(3723).label(), "01:02:03");
        assert_eq!(at(90).label(), "00:01:30");
        assert_eq!(at(-10).label(), "SPAWNING NOW!");
        assert_eq!(at(-600).label(), "Spawn Passed");
        assert_eq!(countdown(None, &now).label(), "--:--:--");
        assert_eq!(at(90).tier.color(), "#ff9900");
    }

    #[test]
    fn should_floor_partial_seconds() {
        let now = Utc::now();
        let state = countdown(Some(&(now + Duration::milliseconds(1500))), &now);
        assert_eq!(state.remaining_seconds, Some(1));

        let state = countdown(Some(&(now - Duration::milliseconds(1500))), &now);
        assert_eq!(state.remaining_seconds, Some(-2));
    }

    #[test]
    fn should_tick_idempotently() {
        let now = Utc::now();
        let boss = resolved("a", Some(now + Duration::seconds(42)));

        assert_eq!(CountdownEngine::tick(&boss, &now), CountdownEngine::tick(&boss, &now));
    }

    #[test]
    fn should_recompute_from_wall_clock_after_gap() {
        let now = Utc::now();
        let boss = resolved("a", Some(now + Duration::seconds(120)));

        assert_eq!(CountdownEngine::tick(&boss, &now).tier, Tier::Imminent);
        let later = now + Duration::minutes(30);
        assert_eq!(CountdownEngine::tick(&boss, &later).tier, Tier::Passed);
    }
}
