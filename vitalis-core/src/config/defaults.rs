//! Default configuration values for Vitalis Core.
//!
//! These functions back the `#[serde(default = "...")]` attributes in
//! [`super::types`].

use crate::config::{LoggingConfig, NotificationEngineConfig};
use std::path::PathBuf;

pub(crate) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_log_file_path() -> Option<PathBuf> {
    None
}

pub(crate) fn default_log_format() -> String {
    "text".to_string()
}

pub(crate) fn default_notification_engine_config() -> NotificationEngineConfig {
    NotificationEngineConfig {
        sweep_interval_secs: default_sweep_interval_secs(),
        default_toast_duration_ms: default_toast_duration_ms(),
        default_toast_position: default_toast_position(),
        event_channel_capacity: default_event_channel_capacity(),
        storage_dir: None,
        notifications_key: default_notifications_key(),
        preferences_key: default_preferences_key(),
    }
}

/// Expiry sweep period.
pub(crate) fn default_sweep_interval_secs() -> u64 {
    60
}

pub(crate) fn default_toast_duration_ms() -> u64 {
    5000
}

pub(crate) fn default_toast_position() -> String {
    "top-right".to_string()
}

pub(crate) fn default_event_channel_capacity() -> usize {
    64
}

pub(crate) fn default_notifications_key() -> String {
    "notifications".to_string()
}

pub(crate) fn default_preferences_key() -> String {
    "preferences".to_string()
}
