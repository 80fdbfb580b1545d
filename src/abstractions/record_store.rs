use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use hashbrown::HashMap;
use log::debug;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

/// Children of a collection in store iteration order.
pub type Snapshot = Vec<(String, Value)>;

// paths are either `collection` or `collection/key`
#[cfg_attr(test, automock)]
pub trait RecordStore : Send + Sync + 'static {
    fn read_all(&self, path: &str) -> Result<Snapshot>;
    fn read_one(&self, path: &str) -> Result<Option<Value>>;
    fn create(&self, path: &str, value: Value) -> Result<String>;
    fn update(&self, path: &str, partial: Value) -> Result<()>;
    fn delete(&self, path: &str) -> Result<()>;
    /// Pushes the full collection on every change, starting with the
    /// current contents.
    fn subscribe(&self, path: &str) -> Result<UnboundedReceiver<Snapshot>>;
}

#[derive(Default)]
struct MemoryState {
    collections: HashMap<String, Snapshot>,
    subscribers: HashMap<String, Vec<UnboundedSender<Snapshot>>>,
}

impl MemoryState {
    fn snapshot(&self, collection: &str) -> Snapshot {
        self.collections.get(collection).cloned().unwrap_or_default()
    }

    fn notify(&mut self, collection: &str) {
        let snapshot = self.snapshot(collection);

        if let Some(subscribers) = self.subscribers.get_mut(collection) {
            subscribers.retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
        }
    }
}

/// In-process store with the same semantics as the hosted one: ordered
/// collections, generated keys, shallow-merge updates and live
/// subscriptions.
pub struct MemoryRecordStore {
    state: Mutex<MemoryState>,
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    let path = path.trim_matches('/');

    match path.split_once('/') {
        Some((collection, key)) => (collection, Some(key)),
        None => (path, None),
    }
}

fn require_key<'a>(path: &'a str) -> Result<(&'a str, &'a str)> {
    match split_path(path) {
        (collection, Some(key)) if !collection.is_empty() && !key.is_empty() => Ok((collection, key)),
        _ => Err(anyhow!("expected collection/key path, got '{}'", path)),
    }
}

impl RecordStore for MemoryRecordStore {
    fn read_all(&self, path: &str) -> Result<Snapshot> {
        let state = self.lock()?;
        let (collection, _) = split_path(path);

        Ok(state.snapshot(collection))
    }

    fn read_one(&self, path: &str) -> Result<Option<Value>> {
        let state = self.lock()?;
        let (collection, key) = require_key(path)?;

        let value = state
            .collections
            .get(collection)
            .and_then(|children| children.iter().find(|(child, _)| child == key))
            .map(|(_, value)| value.clone());

        Ok(value)
    }

    fn create(&self, path: &str, value: Value) -> Result<String> {
        let mut state = self.lock()?;
        let (collection, _) = split_path(path);
        let key = Uuid::new_v4().simple().to_string();

        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push((key.clone(), value));

        debug!("created {}/{}", collection, key);
        state.notify(collection);

        Ok(key)
    }

    fn update(&self, path: &str, partial: Value) -> Result<()> {
        let Value::Object(fields) = partial else {
            bail!("update of '{}' expects an object", path);
        };

        let mut state = self.lock()?;
        let (collection, key) = require_key(path)?;
        let children = state.collections.entry(collection.to_string()).or_default();

        match children.iter_mut().find(|(child, _)| child == key) {
            Some((_, Value::Object(existing))) => {
                for (field, value) in fields {
                    if value.is_null() {
                        existing.remove(&field);
                    } else {
                        existing.insert(field, value);
                    }
                }
            }
            Some((_, existing)) => *existing = Value::Object(fields),
            None => children.push((key.to_string(), Value::Object(fields))),
        }

        debug!("updated {}/{}", collection, key);
        state.notify(collection);

        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let mut state = self.lock()?;
        let (collection, key) = require_key(path)?;

        if let Some(children) = state.collections.get_mut(collection) {
            children.retain(|(child, _)| child != key);
        }

        debug!("deleted {}/{}", collection, key);
        state.notify(collection);

        Ok(())
    }

    fn subscribe(&self, path: &str) -> Result<UnboundedReceiver<Snapshot>> {
        let mut state = self.lock()?;
        let (collection, _) = split_path(path);
        let (tx, rx) = mpsc::unbounded_channel();

        // a fresh receiver cannot be closed yet
        let _ = tx.send(state.snapshot(collection));

        state
            .subscribers
            .entry(collection.to_string())
            .or_default()
            .push(tx);

        Ok(rx)
    }
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Writes a value under a caller-chosen key, e.g. an access token.
    pub fn insert(&self, path: &str, value: Value) -> Result<()> {
        let mut state = self.lock()?;
        let (collection, key) = require_key(path)?;
        let children = state.collections.entry(collection.to_string()).or_default();

        match children.iter_mut().find(|(child, _)| child == key) {
            Some((_, existing)) => *existing = value,
            None => children.push((key.to_string(), value)),
        }

        state.notify(collection);

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("record store lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_create_and_read_in_insertion_order() {
        let store = MemoryRecordStore::new();
        let first = store.create("bosses", json!({ "name": "A" })).unwrap();
        let second = store.create("bosses", json!({ "name": "B" })).unwrap();

        let all = store.read_all("bosses").unwrap();

        assert_ne!(first, second);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, first);
        assert_eq!(all[1].0, second);
        assert_eq!(store.read_one(&format!("bosses/{second}")).unwrap(), Some(json!({ "name": "B" })));
        assert_eq!(store.read_one("bosses/missing").unwrap(), None);
    }

    #[test]
    fn should_merge_updates() {
        let store = MemoryRecordStore::new();
        let key = store.create("bosses", json!({ "name": "A", "guild": "X" })).unwrap();
        let path = format!("bosses/{key}");

        store.update(&path, json!({ "guild": null, "lastKilledAt": "now" })).unwrap();

        assert_eq!(store.read_one(&path).unwrap(), Some(json!({ "name": "A", "lastKilledAt": "now" })));
        assert!(store.update(&path, json!("scalar")).is_err());
    }

    #[test]
    fn should_delete() {
        let store = MemoryRecordStore::new();
        let key = store.create("bosses", json!({ "name": "A" })).unwrap();

        store.delete(&format!("bosses/{key}")).unwrap();

        assert!(store.read_all("bosses").unwrap().is_empty());
        assert!(store.delete("bosses").is_err());
    }

    #[tokio::test]
    async fn should_push_snapshots_to_subscribers() {
        let store = MemoryRecordStore::new();
        store.insert("tokens/secret", json!(true)).unwrap();

        let mut rx = store.subscribe("bosses").unwrap();
        assert_eq!(rx.recv().await.unwrap(), Snapshot::new());

        let key = store.create("bosses", json!({ "name": "A" })).unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot, vec![(key, json!({ "name": "A" }))]);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_prune_closed_subscribers() {
        let store = MemoryRecordStore::new();
        let rx = store.subscribe("bosses").unwrap();
        drop(rx);

        store.create("bosses", json!({})).unwrap();

        let state = store.lock().unwrap();
        assert!(state.subscribers.get("bosses").unwrap().is_empty());
    }
}
