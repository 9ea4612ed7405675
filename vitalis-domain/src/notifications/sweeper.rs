//! Periodic purge of expired notifications.

use async_trait::async_trait;
use std::sync::{Mutex, Weak};
use std::time::Duration;
use tracing::{debug, info};

use super::scheduler::{TaskId, TaskScheduler};

/// Something the sweeper can purge. Returns how many entries were removed.
#[async_trait]
pub trait SweepTarget: Send + Sync {
    async fn sweep_expired(&self) -> usize;
}

/// Runs [`SweepTarget::sweep_expired`] on a fixed period through the shared
/// [`TaskScheduler`]. The target is held weakly, so the sweep stops on its own
/// once the target is dropped.
#[derive(Debug)]
pub struct ExpirySweeper {
    tasks: TaskScheduler,
    period: Duration,
    running: Mutex<Option<TaskId>>,
}

impl ExpirySweeper {
    pub fn new(tasks: TaskScheduler, period: Duration) -> Self {
        Self { tasks, period, running: Mutex::new(None) }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts sweeping. Calling it again while running returns the live task.
    pub fn start(&self, target: Weak<dyn SweepTarget>) -> TaskId {
        let mut running = self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(id) = *running {
            if self.tasks.is_scheduled(id) {
                return id;
            }
        }

        let id = self.tasks.schedule_repeating("expiry sweep", self.period, move || {
            let target = target.clone();
            async move {
                let Some(target) = target.upgrade() else {
                    debug!("Sweep target dropped, stopping expiry sweep");
                    return false;
                };
                let removed = target.sweep_expired().await;
                if removed > 0 {
                    info!("Expiry sweep removed {} notifications", removed);
                }
                true
            }
        });
        *running = Some(id);
        id
    }

    pub fn is_running(&self) -> bool {
        let running = self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        running.map_or(false, |id| self.tasks.is_scheduled(id))
    }

    /// Returns `false` if no sweep was running.
    pub fn stop(&self) -> bool {
        let taken = self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).take();
        taken.map_or(false, |id| self.tasks.cancel(id))
    }
}
