//! Ephemeral toasts with timed auto-dismiss.
//!
//! Toasts live beside the notification center and are never persisted. Each
//! toast with a non-zero duration owns one countdown in the shared
//! [`TaskScheduler`]; dismissing a toast cancels its countdown, and a countdown
//! firing for a toast that is already gone does nothing. A duration too long
//! to express as a deadline keeps the toast until it is dismissed.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::errors::NotificationError;
use super::events::{publish, NotificationEvent, ToastDismissReason};
use super::scheduler::{TaskId, TaskScheduler};
use super::types::{NotificationCategory, NotificationId, NotificationKind, NotificationPriority};

/// Logical screen anchor of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    TopCenter,
    BottomRight,
    BottomLeft,
    BottomCenter,
}

impl ToastPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastPosition::TopRight => "top-right",
            ToastPosition::TopLeft => "top-left",
            ToastPosition::TopCenter => "top-center",
            ToastPosition::BottomRight => "bottom-right",
            ToastPosition::BottomLeft => "bottom-left",
            ToastPosition::BottomCenter => "bottom-center",
        }
    }
}

impl fmt::Display for ToastPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastPosition {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top-right" => Ok(ToastPosition::TopRight),
            "top-left" => Ok(ToastPosition::TopLeft),
            "top-center" => Ok(ToastPosition::TopCenter),
            "bottom-right" => Ok(ToastPosition::BottomRight),
            "bottom-left" => Ok(ToastPosition::BottomLeft),
            "bottom-center" => Ok(ToastPosition::BottomCenter),
            other => Err(NotificationError::invalid_input(
                "toast position",
                format!("unknown position '{}'", other),
            )),
        }
    }
}

/// What a producer passes to `show_toast`. Unset duration and position take
/// the engine defaults; a duration of zero keeps the toast until dismissed.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastRequest {
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub kind: Option<NotificationKind>,
    pub duration: Option<Duration>,
    pub position: Option<ToastPosition>,
    pub action_label: Option<String>,
    pub action_url: Option<String>,
}

impl ToastRequest {
    pub fn new(
        category: NotificationCategory,
        priority: NotificationPriority,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            priority,
            title: title.into(),
            message: message.into(),
            kind: None,
            duration: None,
            position: None,
            action_label: None,
            action_url: None,
        }
    }

    pub fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Keeps the toast on screen until it is dismissed.
    pub fn persistent(self) -> Self {
        self.with_duration(Duration::ZERO)
    }

    pub fn with_position(mut self, position: ToastPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.action_label = Some(label.into());
        self.action_url = Some(url.into());
        self
    }
}

/// A toast currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastNotification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Zero means persistent.
    pub duration: Duration,
    pub position: ToastPosition,
    pub action_label: Option<String>,
    pub action_url: Option<String>,
    pub shown_at: Instant,
}

impl ToastNotification {
    pub fn is_persistent(&self) -> bool {
        self.duration.is_zero()
    }

    /// Remaining share of the countdown at `now`, from 1.0 down to 0.0.
    ///
    /// Derived from the end time on every call, so a stalled render loop
    /// reads the correct value when it resumes. `None` for persistent toasts.
    pub fn progress_at(&self, now: Instant) -> Option<f32> {
        if self.is_persistent() {
            return None;
        }
        let ends_at = self.shown_at.checked_add(self.duration)?;
        let remaining = ends_at.saturating_duration_since(now);
        Some((remaining.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0))
    }
}

/// Defaults applied to requests that leave duration or position unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastDefaults {
    pub duration: Duration,
    pub position: ToastPosition,
}

impl Default for ToastDefaults {
    fn default() -> Self {
        Self { duration: Duration::from_millis(5000), position: ToastPosition::TopRight }
    }
}

struct ActiveToast {
    toast: ToastNotification,
    timer: Option<TaskId>,
}

struct ToastInner {
    active: Mutex<Vec<ActiveToast>>,
    tasks: TaskScheduler,
    events: broadcast::Sender<NotificationEvent>,
    defaults: ToastDefaults,
}

impl ToastInner {
    fn lock(&self) -> MutexGuard<'_, Vec<ActiveToast>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take(&self, id: &NotificationId) -> Option<ActiveToast> {
        let mut active = self.lock();
        let index = active.iter().position(|t| t.toast.id == *id)?;
        Some(active.remove(index))
    }

    fn expire(&self, id: NotificationId) {
        if self.take(&id).is_some() {
            debug!("Toast {} timed out", id);
            let reason = ToastDismissReason::Timeout;
            publish(&self.events, NotificationEvent::ToastDismissed { id, reason });
        }
    }
}

/// Owns the visible toasts and their countdowns.
#[derive(Clone)]
pub struct ToastScheduler {
    inner: Arc<ToastInner>,
}

impl fmt::Debug for ToastScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastScheduler")
            .field("visible", &self.inner.lock().len())
            .field("defaults", &self.inner.defaults)
            .finish()
    }
}

impl ToastScheduler {
    pub fn new(
        tasks: TaskScheduler,
        events: broadcast::Sender<NotificationEvent>,
        defaults: ToastDefaults,
    ) -> Self {
        let inner = ToastInner { active: Mutex::new(Vec::new()), tasks, events, defaults };
        Self { inner: Arc::new(inner) }
    }

    pub fn defaults(&self) -> ToastDefaults {
        self.inner.defaults
    }

    /// Puts a toast on screen and starts its countdown. Admission is the
    /// caller's concern.
    pub fn show(
        &self,
        request: ToastRequest,
        id: NotificationId,
        timestamp: DateTime<Utc>,
    ) -> ToastNotification {
        let defaults = self.inner.defaults;
        let shown_at = Instant::now();
        let mut duration = request.duration.unwrap_or(defaults.duration);
        if shown_at.checked_add(duration).is_none() {
            warn!(
                "Toast duration {:?} is out of range, keeping toast {} until dismissed",
                duration, id
            );
            duration = Duration::ZERO;
        }
        let toast = ToastNotification {
            id,
            kind: request.kind.unwrap_or_else(|| NotificationKind::for_priority(request.priority)),
            category: request.category,
            priority: request.priority,
            title: request.title,
            message: request.message,
            timestamp,
            duration,
            position: request.position.unwrap_or(defaults.position),
            action_label: request.action_label,
            action_url: request.action_url,
            shown_at,
        };

        {
            let mut active = self.inner.lock();
            let timer = if toast.is_persistent() {
                None
            } else {
                let weak: Weak<ToastInner> = Arc::downgrade(&self.inner);
                let label = format!("toast {}", toast.id);
                let id = toast.id.clone();
                Some(self.inner.tasks.schedule_once(label, toast.duration, async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.expire(id);
                    }
                }))
            };
            active.push(ActiveToast { toast: toast.clone(), timer });
        }

        debug!("Showing toast {} ({:?}, {})", toast.id, toast.duration, toast.position);
        publish(&self.inner.events, NotificationEvent::ToastShown { toast: toast.clone() });
        toast
    }

    /// Removes the toast and cancels its countdown. Returns `false` if it was
    /// already gone.
    pub fn dismiss(&self, id: &NotificationId) -> bool {
        let Some(removed) = self.inner.take(id) else {
            return false;
        };
        if let Some(timer) = removed.timer {
            self.inner.tasks.cancel(timer);
        }
        debug!("Toast {} dismissed", id);
        let reason = ToastDismissReason::User;
        publish(&self.inner.events, NotificationEvent::ToastDismissed { id: id.clone(), reason });
        true
    }

    /// Visible toasts in the order they were shown.
    pub fn visible(&self) -> Vec<ToastNotification> {
        self.inner.lock().iter().map(|t| t.toast.clone()).collect()
    }

    pub fn get(&self, id: &NotificationId) -> Option<ToastNotification> {
        self.inner.lock().iter().find(|t| t.toast.id == *id).map(|t| t.toast.clone())
    }

    pub fn progress(&self, id: &NotificationId) -> Option<f32> {
        let now = Instant::now();
        let active = self.inner.lock();
        active.iter().find(|t| t.toast.id == *id).and_then(|t| t.toast.progress_at(now))
    }

    /// Drops every toast and its countdown without emitting events.
    pub fn clear(&self) -> usize {
        let drained: Vec<ActiveToast> = self.inner.lock().drain(..).collect();
        for timer in drained.iter().filter_map(|t| t.timer) {
            self.inner.tasks.cancel(timer);
        }
        drained.len()
    }
}
