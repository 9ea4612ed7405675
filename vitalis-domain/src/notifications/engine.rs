//! The notification engine: the one object producers and the UI talk to.
//!
//! `NotificationEngine` owns the notification-center state, the preferences,
//! the toast surface and every timer. It is cheap to clone; clones share
//! state. Mutations on the notification list are serialized under a single
//! write lock and persisted before the lock is released, so stored snapshots
//! follow the order in which commands were applied.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};
use vitalis_core::config::NotificationEngineConfig;
use vitalis_core::utils::paths::get_app_data_dir;

use super::admission::{AdmissionDecision, AdmissionPolicy, PreferenceAdmissionGate};
use super::clock::{Clock, SystemClock};
use super::errors::NotificationError;
use super::events::{publish, NotificationEvent};
use super::persistence::{FilesystemKeyValueStore, NotificationPersistence};
use super::persistence_iface::KeyValueStore;
use super::preferences::{NotificationPreferences, PreferencesPatch};
use super::scheduler::{TaskId, TaskScheduler};
use super::store::{NotificationState, StoreCommand, Transition};
use super::sweeper::{ExpirySweeper, SweepTarget};
use super::toast::{
    ToastDefaults, ToastNotification, ToastPosition, ToastRequest, ToastScheduler,
};
use super::types::{
    CategoryFilter, Notification, NotificationCategory, NotificationId, NotificationPriority,
    NotificationRequest, NotificationStats, SortMode,
};

struct EngineInner {
    state: RwLock<NotificationState>,
    preferences: RwLock<NotificationPreferences>,
    persistence: NotificationPersistence,
    policy: Arc<dyn AdmissionPolicy>,
    clock: Arc<dyn Clock>,
    tasks: TaskScheduler,
    toasts: ToastScheduler,
    sweeper: ExpirySweeper,
    events: broadcast::Sender<NotificationEvent>,
}

impl EngineInner {
    async fn admit(
        &self,
        category: NotificationCategory,
        priority: NotificationPriority,
    ) -> bool {
        let decision = {
            let preferences = self.preferences.read().await;
            self.policy.evaluate(&preferences, category, priority, self.clock.local_now())
        };
        if decision.is_allowed() {
            return true;
        }
        let reason = match decision {
            AdmissionDecision::DenyGloballyDisabled => "notifications disabled",
            AdmissionDecision::DenyCategoryDisabled => "category disabled",
            AdmissionDecision::DenyQuietHours => "quiet hours",
            AdmissionDecision::Allow => "allowed",
        };
        info!("Suppressed {:?} {} notification: {}", priority, category, reason);
        publish(&self.events, NotificationEvent::Suppressed { category, priority });
        false
    }

    /// Applies `command` and persists the list if it changed.
    async fn dispatch(&self, command: StoreCommand) -> Transition {
        let mut state = self.state.write().await;
        let transition = state.apply(command);
        if transition.list_changed {
            self.persist_notifications(&state).await;
        }
        transition
    }

    async fn persist_notifications(&self, state: &NotificationState) {
        if let Err(e) = self.persistence.save_notifications(&state.to_vec()).await {
            error!("Failed to persist notifications, continuing with in-memory state: {}", e);
        }
    }

    async fn persist_preferences(&self, preferences: &NotificationPreferences) {
        if let Err(e) = self.persistence.save_preferences(preferences).await {
            error!("Failed to persist preferences, continuing with in-memory state: {}", e);
        }
    }

    async fn clear_expired(&self) -> Vec<NotificationId> {
        let now = self.clock.now();
        let transition = self.dispatch(StoreCommand::ClearExpired(now)).await;
        if !transition.affected.is_empty() {
            let ids = transition.affected.clone();
            publish(&self.events, NotificationEvent::Expired { ids });
        }
        transition.affected
    }
}

#[async_trait]
impl SweepTarget for EngineInner {
    async fn sweep_expired(&self) -> usize {
        self.clear_expired().await.len()
    }
}

/// Client-side notification engine.
#[derive(Clone)]
pub struct NotificationEngine {
    inner: Arc<EngineInner>,
}

impl fmt::Debug for NotificationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationEngine")
            .field("persistence", &self.inner.persistence)
            .field("tasks", &self.inner.tasks)
            .field("toasts", &self.inner.toasts)
            .finish()
    }
}

fn toast_defaults(config: &NotificationEngineConfig) -> ToastDefaults {
    let position = config.default_toast_position.parse::<ToastPosition>().unwrap_or_else(|e| {
        warn!("{}; using {}", e, ToastPosition::default());
        ToastPosition::default()
    });
    let duration = Duration::from_millis(config.default_toast_duration_ms);
    ToastDefaults { duration, position }
}

impl NotificationEngine {
    /// Builds an engine with the preference-driven admission gate and
    /// rehydrates it from `store`.
    pub async fn new(
        config: &NotificationEngineConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_policy(config, store, clock, Arc::new(PreferenceAdmissionGate)).await
    }

    /// Like [`NotificationEngine::new`] with a custom admission policy.
    pub async fn with_policy(
        config: &NotificationEngineConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        policy: Arc<dyn AdmissionPolicy>,
    ) -> Self {
        let persistence = NotificationPersistence::new(
            store,
            config.notifications_key.clone(),
            config.preferences_key.clone(),
        );
        let notifications = persistence.load_notifications().await;
        let preferences = persistence.load_preferences().await;
        let state = NotificationState::from_notifications(notifications);
        info!(
            "Notification engine loaded {} notifications ({} unread)",
            state.len(),
            state.unread_count()
        );

        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));
        let tasks = TaskScheduler::new();
        let toasts = ToastScheduler::new(tasks.clone(), events.clone(), toast_defaults(config));
        let sweep_period = Duration::from_secs(config.sweep_interval_secs.max(1));
        let sweeper = ExpirySweeper::new(tasks.clone(), sweep_period);

        Self {
            inner: Arc::new(EngineInner {
                state: RwLock::new(state),
                preferences: RwLock::new(preferences),
                persistence,
                policy,
                clock,
                tasks,
                toasts,
                sweeper,
                events,
            }),
        }
    }

    /// Opens an engine backed by JSON files in `config.storage_dir`, or in
    /// `<app data dir>/notifications` when unset, using the system clock.
    pub async fn open_default(
        config: &NotificationEngineConfig,
    ) -> Result<Self, NotificationError> {
        let directory = match &config.storage_dir {
            Some(dir) => dir.clone(),
            None => get_app_data_dir()?.join("notifications"),
        };
        debug!("Opening notification storage at {:?}", directory);
        let store = FilesystemKeyValueStore::new(directory)?;
        Ok(Self::new(config, Arc::new(store), Arc::new(SystemClock)).await)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    // --- Producer API ---

    /// Admits and stores a notification. Returns `None` when the admission
    /// gate denies it; nothing is stored in that case.
    pub async fn add_notification(&self, request: NotificationRequest) -> Option<NotificationId> {
        if !self.inner.admit(request.category, request.priority).await {
            return None;
        }
        let now = self.inner.clock.now();
        let notification = Notification::new(request, NotificationId::generate(), now);
        let id = notification.id.clone();
        self.inner.dispatch(StoreCommand::Add(notification.clone())).await;
        publish(&self.inner.events, NotificationEvent::Added { notification });
        Some(id)
    }

    /// Admits and shows a toast. Returns `None` when the admission gate denies it.
    pub async fn show_toast(&self, request: ToastRequest) -> Option<NotificationId> {
        if !self.inner.admit(request.category, request.priority).await {
            return None;
        }
        let now = self.inner.clock.now();
        let toast = self.inner.toasts.show(request, NotificationId::generate(), now);
        Some(toast.id)
    }

    pub fn dismiss_toast(&self, id: &NotificationId) -> bool {
        self.inner.toasts.dismiss(id)
    }

    pub async fn mark_as_read(&self, id: &NotificationId) -> bool {
        let changed = self.inner.dispatch(StoreCommand::MarkRead(id.clone())).await.list_changed;
        if changed {
            publish(&self.inner.events, NotificationEvent::Read { id: id.clone() });
        }
        changed
    }

    /// Returns how many entries changed.
    pub async fn mark_all_as_read(&self) -> usize {
        let affected = self.inner.dispatch(StoreCommand::MarkAllRead).await.affected.len();
        if affected > 0 {
            publish(&self.inner.events, NotificationEvent::AllRead);
        }
        affected
    }

    pub async fn dismiss(&self, id: &NotificationId) -> bool {
        let changed = self.inner.dispatch(StoreCommand::Dismiss(id.clone())).await.list_changed;
        if changed {
            publish(&self.inner.events, NotificationEvent::Dismissed { id: id.clone() });
        }
        changed
    }

    /// Returns how many entries changed.
    pub async fn dismiss_all(&self) -> usize {
        let affected = self.inner.dispatch(StoreCommand::DismissAll).await.affected.len();
        if affected > 0 {
            publish(&self.inner.events, NotificationEvent::AllDismissed);
        }
        affected
    }

    pub async fn remove(&self, id: &NotificationId) -> bool {
        let changed = self.inner.dispatch(StoreCommand::Remove(id.clone())).await.list_changed;
        if changed {
            publish(&self.inner.events, NotificationEvent::Removed { id: id.clone() });
        }
        changed
    }

    pub async fn set_filter(&self, filter: impl Into<CategoryFilter>) {
        self.inner.dispatch(StoreCommand::SetFilter(filter.into())).await;
    }

    pub async fn set_sort_by(&self, sort_by: SortMode) {
        self.inner.dispatch(StoreCommand::SetSortBy(sort_by)).await;
    }

    pub async fn filtered_notifications(&self) -> Vec<Notification> {
        self.inner.state.read().await.filtered()
    }

    /// Runs the expiry purge now and returns the removed ids.
    pub async fn clear_expired(&self) -> Vec<NotificationId> {
        self.inner.clear_expired().await
    }

    // --- Preferences ---

    pub async fn preferences(&self) -> NotificationPreferences {
        self.inner.preferences.read().await.clone()
    }

    pub async fn update_preferences(
        &self,
        patch: PreferencesPatch,
    ) -> NotificationPreferences {
        let updated = {
            let mut preferences = self.inner.preferences.write().await;
            preferences.apply_patch(patch);
            self.inner.persist_preferences(&preferences).await;
            preferences.clone()
        };
        debug!("Preferences updated");
        publish(&self.inner.events, NotificationEvent::PreferencesChanged);
        updated
    }

    pub async fn toggle_category(&self, category: NotificationCategory, enabled: bool) {
        {
            let mut preferences = self.inner.preferences.write().await;
            preferences.set_category_enabled(category, enabled);
            self.inner.persist_preferences(&preferences).await;
        }
        debug!("Category {} {}", category, if enabled { "enabled" } else { "disabled" });
        publish(&self.inner.events, NotificationEvent::PreferencesChanged);
    }

    /// Whether a request with this category and priority would be admitted now.
    pub async fn should_show(
        &self,
        category: NotificationCategory,
        priority: NotificationPriority,
    ) -> bool {
        let preferences = self.inner.preferences.read().await;
        let now = self.inner.clock.local_now();
        self.inner.policy.evaluate(&preferences, category, priority, now).is_allowed()
    }

    pub async fn is_quiet_hours_active(&self) -> bool {
        let now = self.inner.clock.local_now();
        self.inner.preferences.read().await.is_quiet_hours_active(now)
    }

    // --- Queries ---

    pub async fn unread_count(&self) -> usize {
        self.inner.state.read().await.unread_count()
    }

    pub async fn get_notification(&self, id: &NotificationId) -> Option<Notification> {
        self.inner.state.read().await.get(id).cloned()
    }

    /// Every stored entry, most recent first, dismissed ones included.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.state.read().await.to_vec()
    }

    pub async fn stats(&self) -> NotificationStats {
        self.inner.state.read().await.stats()
    }

    pub async fn filter(&self) -> CategoryFilter {
        self.inner.state.read().await.filter()
    }

    pub async fn sort_by(&self) -> SortMode {
        self.inner.state.read().await.sort_by()
    }

    pub fn toasts(&self) -> Vec<ToastNotification> {
        self.inner.toasts.visible()
    }

    pub fn toast_progress(&self, id: &NotificationId) -> Option<f32> {
        self.inner.toasts.progress(id)
    }

    // --- Lifecycle ---

    /// Starts the periodic expiry sweep. Idempotent.
    pub fn start_sweeper(&self) -> TaskId {
        let target = Arc::downgrade(&self.inner) as Weak<dyn SweepTarget>;
        let id = self.inner.sweeper.start(target);
        info!("Expiry sweep running every {:?}", self.inner.sweeper.period());
        id
    }

    pub fn is_sweeper_running(&self) -> bool {
        self.inner.sweeper.is_running()
    }

    /// Stops the sweep, drops all toasts and cancels every remaining timer.
    pub fn shutdown(&self) {
        self.inner.sweeper.stop();
        let toasts = self.inner.toasts.clear();
        let tasks = self.inner.tasks.cancel_all();
        info!(
            "Notification engine shut down ({} toasts dropped, {} timers cancelled)",
            toasts, tasks
        );
    }
}
