//! A single registry for every timer the engine runs.
//!
//! Toast countdowns and the expiry sweep are both [`ScheduledTask`]s: each has
//! an id, a fire time and an abort handle, and lives in one map until it
//! completes or is cancelled. Cancelling an id that already fired is a no-op.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};
use vitalis_core::utils::{interval_at, sleep_until, spawn_task};

/// Upper bound on how far ahead a task can be scheduled; longer delays are
/// clamped to it.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay.min(FAR_FUTURE)).unwrap_or(now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

struct ScheduledTask {
    label: String,
    fire_at: Instant,
    handle: JoinHandle<()>,
}

/// Snapshot of a live task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub id: TaskId,
    pub label: String,
    pub fire_at: Instant,
}

#[derive(Default)]
struct SchedulerInner {
    tasks: Mutex<HashMap<TaskId, ScheduledTask>>,
    next_id: AtomicU64,
}

impl SchedulerInner {
    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, ScheduledTask>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn deregister(&self, id: TaskId) {
        if self.lock().remove(&id).is_some() {
            trace!("Task {} finished", id);
        }
    }

    fn reschedule(&self, id: TaskId, fire_at: Instant) {
        if let Some(task) = self.lock().get_mut(&id) {
            task.fire_at = fire_at;
        }
    }
}

impl Drop for SchedulerInner {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (_, task) in tasks.drain() {
            task.handle.abort();
        }
    }
}

/// Cheaply cloneable handle to the task registry. Dropping the last handle
/// aborts all live tasks.
///
/// Scheduling spawns onto the current Tokio runtime and must be called from
/// within one.
#[derive(Clone, Default)]
pub struct TaskScheduler {
    inner: Arc<SchedulerInner>,
}

impl fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskScheduler").field("live_tasks", &self.inner.lock().len()).finish()
    }
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> TaskId {
        TaskId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Runs `task` once after `delay`.
    pub fn schedule_once<F>(&self, label: impl Into<String>, delay: Duration, task: F) -> TaskId
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id();
        let label = label.into();
        let fire_at = deadline_after(delay);
        let weak: Weak<SchedulerInner> = Arc::downgrade(&self.inner);

        // Held across the spawn so the task cannot deregister before it is inserted.
        let mut tasks = self.inner.lock();
        let handle = spawn_task(async move {
            sleep_until(fire_at).await;
            task.await;
            if let Some(inner) = weak.upgrade() {
                inner.deregister(id);
            }
        });
        debug!("Scheduled {} ({}) in {:?}", id, label, delay);
        tasks.insert(id, ScheduledTask { label, fire_at, handle });
        id
    }

    /// Calls `tick` every `period`, first after one full period, until it
    /// returns `false` or the task is cancelled.
    pub fn schedule_repeating<F, Fut>(
        &self,
        label: impl Into<String>,
        period: Duration,
        mut tick: F,
    ) -> TaskId
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let id = self.next_id();
        let label = label.into();
        let period = period.min(FAR_FUTURE);
        let fire_at = deadline_after(period);
        let weak: Weak<SchedulerInner> = Arc::downgrade(&self.inner);

        let mut tasks = self.inner.lock();
        let handle = spawn_task(async move {
            let mut ticker = interval_at(fire_at, period);
            loop {
                ticker.tick().await;
                if let Some(inner) = weak.upgrade() {
                    inner.reschedule(id, deadline_after(period));
                }
                if !tick().await {
                    break;
                }
            }
            if let Some(inner) = weak.upgrade() {
                inner.deregister(id);
            }
        });
        debug!("Scheduled repeating {} ({}) every {:?}", id, label, period);
        tasks.insert(id, ScheduledTask { label, fire_at, handle });
        id
    }

    /// Aborts the task. Returns `false` if it already completed or was
    /// cancelled before.
    pub fn cancel(&self, id: TaskId) -> bool {
        match self.inner.lock().remove(&id) {
            Some(task) => {
                task.handle.abort();
                debug!("Cancelled {} ({})", id, task.label);
                true
            }
            None => false,
        }
    }

    /// Aborts every live task and returns how many there were.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(TaskId, ScheduledTask)> = self.inner.lock().drain().collect();
        for (_, task) in &drained {
            task.handle.abort();
        }
        if !drained.is_empty() {
            debug!("Cancelled {} scheduled tasks", drained.len());
        }
        drained.len()
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.inner.lock().contains_key(&id)
    }

    /// Live tasks ordered by fire time.
    pub fn pending(&self) -> Vec<PendingTask> {
        let mut pending: Vec<PendingTask> = self
            .inner
            .lock()
            .iter()
            .map(|(id, task)| PendingTask {
                id: *id,
                label: task.label.clone(),
                fire_at: task.fire_at,
            })
            .collect();
        pending.sort_by_key(|t| (t.fire_at, t.id));
        pending
    }
}
