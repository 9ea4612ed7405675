//! Domain layer for Vitalis.
//!
//! The crate hosts the client-side notification engine: producers (vital
//! monitors, medication and appointment timers, content recommenders) call
//! into [`notifications::NotificationEngine`], which decides through the
//! user's preferences whether an alert is shown, keeps the notification
//! center and the toast surface, and persists state through a pluggable
//! key-value store.

pub use vitalis_core as core;

pub mod error;
pub mod notifications;

pub use error::{DomainError, DomainResult};
pub use notifications::{
    NotificationCategory, NotificationEngine, NotificationError, NotificationId,
    NotificationPriority, NotificationRequest, ToastRequest,
};
