use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::trace;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Message sent by a row's ticker. `generation` identifies the ticker that
/// produced it so ticks from a replaced ticker can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTick {
    pub key: String,
    pub generation: u64,
}

/// Repeating timer owned by exactly one rendered row.
///
/// Started when the row is created, aborted when it is dropped.
#[derive(Debug)]
pub struct Ticker {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Must be called from within a tokio runtime.
    pub fn start(key: String, period: Duration, tx: UnboundedSender<RowTick>) -> Self {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);

        let handle = tokio::spawn(async move {
            let mut timer = interval(period);
            // after a stall, fire once and carry on instead of bursting
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick completes immediately, the row was just rendered
            timer.tick().await;

            loop {
                timer.tick().await;

                let tick = RowTick { key: key.clone(), generation };

                if tx.send(tick).is_err() {
                    trace!("tick receiver for {} closed", key);
                    break;
                }
            }
        });

        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
