#[cfg(test)]
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
#[cfg(test)]
use time::Duration;

/// Source of wall-clock time for everything that counts down.
///
/// Components never read the system clock themselves; the presentation reads
/// one instant per tick through this trait and hands it down.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Real time, in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that only moves when told to. Clones share the same instant, so a
/// test can keep one handle and give another to the component under test.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<OffsetDateTime>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Start at a whole number of seconds since the Unix epoch.
    pub fn at_unix(secs: i64) -> Self {
        Self::new(OffsetDateTime::UNIX_EPOCH + Duration::seconds(secs))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: OffsetDateTime) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = to;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
