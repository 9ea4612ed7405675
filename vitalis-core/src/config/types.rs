//! Configuration Data Structures for Vitalis Core.
//!
//! All structs reject unknown fields and fall back to the functions in
//! [`super::defaults`] for anything the file leaves out.

use super::defaults;
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration settings for the logging subsystem.
///
/// ```
/// use vitalis_core::config::LoggingConfig;
///
/// let toml_str = r#"
/// level = "debug"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, None);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths are resolved against the app state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Tunables of the notification engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationEngineConfig {
    /// Period of the expiry sweep, in seconds.
    #[serde(default = "defaults::default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Toast lifetime used when a producer does not pass one. `0` keeps toasts until dismissed.
    #[serde(default = "defaults::default_toast_duration_ms")]
    pub default_toast_duration_ms: u64,
    #[serde(default = "defaults::default_toast_position")]
    pub default_toast_position: String,
    #[serde(default = "defaults::default_event_channel_capacity")]
    pub event_channel_capacity: usize,
    /// Directory for the persisted records. `None` means the app data directory.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    #[serde(default = "defaults::default_notifications_key")]
    pub notifications_key: String,
    #[serde(default = "defaults::default_preferences_key")]
    pub preferences_key: String,
}

impl Default for NotificationEngineConfig {
    fn default() -> Self {
        defaults::default_notification_engine_config()
    }
}

/// Root configuration structure.
///
/// ```
/// use vitalis_core::config::CoreConfig;
///
/// let toml_str = r#"
/// [logging]
/// level = "warn"
///
/// [notifications]
/// sweep_interval_secs = 30
/// "#;
/// let config: CoreConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(config.logging.level, "warn");
/// assert_eq!(config.notifications.sweep_interval_secs, 30);
/// assert_eq!(config.notifications.default_toast_duration_ms, 5000);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
    #[serde(default = "defaults::default_notification_engine_config")]
    pub notifications: NotificationEngineConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            logging: defaults::default_logging_config(),
            notifications: defaults::default_notification_engine_config(),
        }
    }
}
