//! Time source for the engine.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::sync::Mutex;

/// Supplies the current instant. Quiet hours are evaluated on local wall-clock
/// time, everything stored uses UTC.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn local_now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock for tests and simulations. Local and UTC time coincide.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { current: Mutex::new(start) }
    }

    pub fn set(&self, instant: NaiveDateTime) {
        *self.lock() = instant;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.lock();
        *current += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.lock())
    }

    fn local_now(&self) -> NaiveDateTime {
        *self.lock()
    }
}
