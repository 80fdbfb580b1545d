use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::abstractions::{RecordStore, Snapshot};
use crate::access::EditorCapability;
use crate::constants::{BOSSES_PATH, DEFAULT_GUILD};
use crate::countdown::CountdownEngine;
use crate::error::TrackerError;
use crate::models::{BossRecord, StoredBoss, LEGACY_FIELDS};
use crate::spawn_resolver::{derive_next_spawn, reset_fields, resolve_all, to_datetime_local_input, ResetFields};

/// Add/edit form state. Inputs mirror the record fields as the user typed
/// them; `edit_key` is set while editing an existing boss.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BossForm {
    pub name: String,
    pub kill_interval_hours: String,
    pub last_killed: String,
    pub next_spawn: String,
    pub guild: String,
    pub weekly_schedule: String,
    pub edit_key: Option<String>,
}

impl BossForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_kill_interval_hours<Tz: TimeZone>(&mut self, value: &str, tz: &Tz)
    where
        Tz::Offset: Display,
    {
        self.kill_interval_hours = value.to_string();
        self.recompute_next_spawn(tz);
    }

    pub fn set_last_killed<Tz: TimeZone>(&mut self, value: &str, tz: &Tz)
    where
        Tz::Offset: Display,
    {
        self.last_killed = value.to_string();
        self.recompute_next_spawn(tz);
    }

    // leaves next_spawn alone when the inputs don't give a usable result
    fn recompute_next_spawn<Tz: TimeZone>(&mut self, tz: &Tz)
    where
        Tz::Offset: Display,
    {
        if let Some(next_spawn) = derive_next_spawn(&self.last_killed, &self.kill_interval_hours, tz) {
            self.next_spawn = next_spawn;
        }
    }

    /// Fills the form from a stored record without recomputing anything.
    pub fn from_record<Tz: TimeZone>(key: &str, record: &BossRecord, tz: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        Self {
            name: record.name.clone().unwrap_or_default(),
            kill_interval_hours: record.kill_interval_hours.clone().unwrap_or_default(),
            last_killed: to_datetime_local_input(record.last_killed_at.as_deref(), tz),
            next_spawn: to_datetime_local_input(record.next_spawn_at.as_deref(), tz),
            guild: record.guild.clone().unwrap_or_else(|| DEFAULT_GUILD.to_string()),
            weekly_schedule: record.weekly_schedule.clone().unwrap_or_default(),
            edit_key: Some(key.to_string()),
        }
    }

    /// Record fields to write. Blank inputs are `null` so that an update
    /// clears them from the stored record.
    pub fn to_fields(&self) -> Map<String, Value> {
        let text = |value: &str| {
            let value = value.trim();
            if value.is_empty() {
                Value::Null
            } else {
                Value::String(value.to_string())
            }
        };

        let guild = match self.guild.trim() {
            "" => DEFAULT_GUILD,
            guild => guild,
        };

        let mut fields = Map::new();
        fields.insert("name".into(), Value::String(self.name.trim().to_string()));
        fields.insert("guild".into(), Value::String(guild.to_string()));
        fields.insert("killIntervalHours".into(), text(&self.kill_interval_hours));
        fields.insert("lastKilledAt".into(), text(&self.last_killed));
        fields.insert("nextSpawnAt".into(), text(&self.next_spawn));
        fields.insert("weeklySchedule".into(), text(&self.weekly_schedule));
        fields
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One row of the editing table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BossListRow {
    pub key: String,
    pub name: String,
    pub guild: String,
    pub interval: String,
    pub last_killed: String,
    pub next_spawn: String,
    pub schedule: String,
}

impl BossListRow {
    fn from_record(key: String, record: &BossRecord) -> Self {
        let or_dashes = |value: Option<&String>| {
            value
                .filter(|value| !value.is_empty())
                .cloned()
                .unwrap_or_else(|| "--".to_string())
        };

        Self {
            name: record.display_name().to_string(),
            guild: record.guild_tag().to_string(),
            interval: format!("{} hr", or_dashes(record.kill_interval_hours.as_ref())),
            last_killed: or_dashes(record.last_killed_at.as_ref()),
            next_spawn: or_dashes(record.next_spawn_at.as_ref()),
            schedule: or_dashes(record.weekly_schedule.as_ref()),
            key,
        }
    }
}

/// Editing operations on the `bosses` collection. Every write requires an
/// [`EditorCapability`].
pub struct BossList<RS: RecordStore> {
    store: Arc<RS>,
}

impl<RS: RecordStore> BossList<RS> {
    pub fn new(store: Arc<RS>) -> Self {
        Self { store }
    }

    pub fn subscribe(&self) -> Result<UnboundedReceiver<Snapshot>, TrackerError> {
        Ok(self.store.subscribe(BOSSES_PATH)?)
    }

    /// Table rows sorted by effective next spawn, unknown last.
    pub fn rows_from_snapshot<Tz: TimeZone>(snapshot: Snapshot, now: &DateTime<Tz>) -> Vec<BossListRow> {
        let resolved = resolve_all(StoredBoss::from_entries(snapshot), now);

        CountdownEngine::new(resolved)
            .into_sorted()
            .into_iter()
            .map(|boss| BossListRow::from_record(boss.key, &boss.record))
            .collect()
    }

    pub fn rows<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Vec<BossListRow>, TrackerError> {
        let snapshot = self.store.read_all(BOSSES_PATH)?;
        Ok(Self::rows_from_snapshot(snapshot, now))
    }

    fn fetch(&self, key: &str) -> Result<BossRecord, TrackerError> {
        match self.store.read_one(&format!("{BOSSES_PATH}/{key}"))? {
            Some(value) => Ok(BossRecord::from_value(key, value)),
            None => Err(TrackerError::NotFound { key: key.to_string() }),
        }
    }

    pub fn open_for_edit<Tz: TimeZone>(
        &self,
        _capability: &EditorCapability,
        key: &str,
        tz: &Tz,
    ) -> Result<BossForm, TrackerError>
    where
        Tz::Offset: Display,
    {
        let record = self.fetch(key)?;
        Ok(BossForm::from_record(key, &record, tz))
    }

    /// Creates a new boss, or updates the one being edited. Returns its key.
    pub fn submit(&self, _capability: &EditorCapability, form: &BossForm) -> Result<String, TrackerError> {
        let mut fields = form.to_fields();

        match &form.edit_key {
            Some(key) => {
                self.fetch(key)?;

                // the form carries every field under its current name
                for field in LEGACY_FIELDS {
                    fields.insert(field.into(), Value::Null);
                }

                self.store
                    .update(&format!("{BOSSES_PATH}/{key}"), Value::Object(fields))?;
                info!("updated boss {}", key);
                Ok(key.clone())
            }
            None => {
                fields.retain(|_, value| !value.is_null());
                let key = self.store.create(BOSSES_PATH, Value::Object(fields))?;
                info!("created boss {}", key);
                Ok(key)
            }
        }
    }

    /// Marks the boss as killed at `now`. Without a usable kill interval
    /// nothing is written and `None` is returned.
    pub fn reset(
        &self,
        _capability: &EditorCapability,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetFields>, TrackerError> {
        let record = self.fetch(key)?;

        let Some(fields) = record.interval_hours().and_then(|hours| reset_fields(now, hours)) else {
            info!("boss {} has no kill interval, reset skipped", key);
            return Ok(None);
        };

        let mut partial = Map::new();
        partial.insert("lastKilledAt".into(), Value::String(fields.last_killed_at.clone()));
        partial.insert("nextSpawnAt".into(), Value::String(fields.next_spawn_at.clone()));
        partial.insert("lastKilled".into(), Value::Null);
        partial.insert("nextSpawn".into(), Value::Null);

        self.store
            .update(&format!("{BOSSES_PATH}/{key}"), Value::Object(partial))?;
        info!("reset boss {}", key);

        Ok(Some(fields))
    }

    pub fn delete(&self, _capability: &EditorCapability, key: &str) -> Result<(), TrackerError> {
        self.fetch(key)?;
        self.store.delete(&format!("{BOSSES_PATH}/{key}"))?;
        info!("deleted boss {}", key);

        Ok(())
    }
}
