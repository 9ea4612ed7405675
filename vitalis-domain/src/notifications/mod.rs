//! Notification engine.
//!
//! Producers call [`NotificationEngine::add_notification`] and
//! [`NotificationEngine::show_toast`]; both go through the admission gate
//! first. Admitted notifications land in the notification-center state
//! ([`store`]), which is persisted through a [`KeyValueStore`] on every change;
//! toasts live in the [`toast`] scheduler and disappear on their own. A
//! periodic [`sweeper`] purges entries past their expiry.

pub mod admission;
pub mod clock;
pub mod engine;
pub mod errors;
pub mod events;
pub mod persistence;
pub mod persistence_iface;
pub mod preferences;
pub mod scheduler;
pub mod store;
pub mod sweeper;
pub mod toast;
pub mod types;

pub use admission::{should_show, AdmissionDecision, AdmissionPolicy, PreferenceAdmissionGate};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::NotificationEngine;
pub use errors::NotificationError;
pub use events::{NotificationEvent, ToastDismissReason};
pub use persistence::{FilesystemKeyValueStore, InMemoryKeyValueStore, NotificationPersistence};
pub use persistence_iface::KeyValueStore;
pub use preferences::{
    parse_time_of_day, CategoryPreference, Frequency, NotificationPreferences, PreferencesPatch,
    QuietHours, QuietHoursPatch,
};
pub use scheduler::{PendingTask, TaskId, TaskScheduler};
pub use store::{reduce, NotificationState, StoreCommand, Transition};
pub use sweeper::{ExpirySweeper, SweepTarget};
pub use toast::{ToastDefaults, ToastNotification, ToastPosition, ToastRequest, ToastScheduler};
pub use types::{
    CategoryFilter, Notification, NotificationCategory, NotificationId, NotificationKind,
    NotificationPriority, NotificationRequest, NotificationStats, SortMode,
};
