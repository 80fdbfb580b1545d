use crate::models::{BossRecord, StoredBoss};

pub fn timed_boss(name: &str, next_spawn_at: &str) -> BossRecord {
    BossRecord {
        name: Some(name.into()),
        next_spawn_at: Some(next_spawn_at.into()),
        ..Default::default()
    }
}

pub fn scheduled_boss(schedule: &str, stale_next_spawn_at: Option<&str>) -> BossRecord {
    BossRecord {
        name: Some("Scheduled".into()),
        weekly_schedule: Some(schedule.into()),
        next_spawn_at: stale_next_spawn_at.map(Into::into),
        ..Default::default()
    }
}

pub fn stored(key: &str, record: BossRecord) -> StoredBoss {
    StoredBoss {
        key: key.into(),
        record,
    }
}
