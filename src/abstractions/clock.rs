use chrono::{DateTime, Local};

#[cfg(test)]
use mockall::automock;

// local device time is authoritative for schedules and display
#[cfg_attr(test, automock)]
pub trait Clock : Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}
