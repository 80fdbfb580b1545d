use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::abstractions::{MemoryRecordStore, RecordStore, Snapshot};

/// Receiver that yields `snapshots` and then reports the subscription as
/// closed.
pub fn closed_subscription(snapshots: Vec<Snapshot>) -> UnboundedReceiver<Snapshot> {
    let (tx, rx) = mpsc::unbounded_channel();

    for snapshot in snapshots {
        tx.send(snapshot).unwrap();
    }

    rx
}

pub fn seeded_store(bosses: &[Value]) -> MemoryRecordStore {
    let store = MemoryRecordStore::new();

    for boss in bosses {
        store.create("bosses", boss.clone()).unwrap();
    }

    store
}
