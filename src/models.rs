use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_GUILD, DEFAULT_NAME};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawBossRecord")]
pub struct BossRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill_interval_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_killed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_spawn_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_schedule: Option<String>,
}

/// Field names written by older clients. Updates set them to `null` so a
/// merged record never carries both spellings.
pub const LEGACY_FIELDS: [&str; 5] = ["bossName", "bossHour", "lastKilled", "nextSpawn", "bossSchedule"];

/// Stored shape with current and legacy names side by side. A record that
/// was edited by both kinds of client may hold both.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBossRecord {
    name: Option<String>,
    boss_name: Option<String>,
    guild: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    kill_interval_hours: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    boss_hour: Option<String>,
    last_killed_at: Option<String>,
    last_killed: Option<String>,
    next_spawn_at: Option<String>,
    next_spawn: Option<String>,
    weekly_schedule: Option<String>,
    boss_schedule: Option<String>,
}

// current name wins unless it is blank
fn prefer(current: Option<String>, legacy: Option<String>) -> Option<String> {
    match current {
        Some(value) if !value.trim().is_empty() => Some(value),
        current => legacy.or(current),
    }
}

impl From<RawBossRecord> for BossRecord {
    fn from(raw: RawBossRecord) -> Self {
        Self {
            name: prefer(raw.name, raw.boss_name),
            guild: raw.guild,
            kill_interval_hours: prefer(raw.kill_interval_hours, raw.boss_hour),
            last_killed_at: prefer(raw.last_killed_at, raw.last_killed),
            next_spawn_at: prefer(raw.next_spawn_at, raw.next_spawn),
            weekly_schedule: prefer(raw.weekly_schedule, raw.boss_schedule),
        }
    }
}

impl BossRecord {
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or(DEFAULT_NAME)
    }

    pub fn guild_tag(&self) -> &str {
        non_empty(self.guild.as_deref()).unwrap_or(DEFAULT_GUILD)
    }

    /// Usable kill interval: present, numeric, finite and strictly positive.
    pub fn interval_hours(&self) -> Option<f64> {
        parse_interval_hours(self.kill_interval_hours.as_deref()?)
    }

    pub fn schedule(&self) -> Option<&str> {
        non_empty(self.weekly_schedule.as_deref())
    }

    /// Decodes a raw store value. Anything that is not a record object
    /// becomes an empty record so the row still renders.
    pub fn from_value(key: &str, value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(record) => record,
            Err(err) => {
                warn!("boss {} has a malformed record: {}", key, err);
                Self::default()
            }
        }
    }
}

pub fn parse_interval_hours(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|hours| hours.is_finite() && *hours > 0.0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
    Other(Value),
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrString>::deserialize(deserializer)?;

    Ok(match value {
        Some(NumberOrString::Number(number)) => Some(number.to_string()),
        Some(NumberOrString::Text(text)) => Some(text),
        Some(NumberOrString::Other(_)) | None => None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredBoss {
    pub key: String,
    pub record: BossRecord,
}

impl StoredBoss {
    pub fn from_entries(entries: Vec<(String, Value)>) -> Vec<Self> {
        entries
            .into_iter()
            .map(|(key, value)| {
                let record = BossRecord::from_value(&key, value);
                Self { key, record }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBoss {
    pub key: String,
    pub record: BossRecord,
    pub spawn_instant: Option<DateTime<Utc>>,
}
