use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait Flags: Send + Sync + 'static {
    fn triggered_stop(&self) -> bool;
    fn triggered_refresh(&self) -> bool;
    fn set_stop(&self);
    /// Requests a full re-read, e.g. the dashboard became visible again.
    fn set_refresh(&self);
    fn clear_refresh(&self);
}

pub struct AtomicBoolFlags {
    stop: AtomicBool,
    refresh: AtomicBool,
}

impl Flags for AtomicBoolFlags {
    fn triggered_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn triggered_refresh(&self) -> bool {
        self.refresh.load(Ordering::Relaxed)
    }

    fn set_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    fn set_refresh(&self) {
        self.refresh.store(true, Ordering::Relaxed);
    }

    fn clear_refresh(&self) {
        self.refresh.store(false, Ordering::Relaxed);
    }
}

impl AtomicBoolFlags {
    pub fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            refresh: AtomicBool::new(false),
        }
    }
}
