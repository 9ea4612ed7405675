//! Configuration Loading for Vitalis Core.
//!
//! [`ConfigLoader::load`] looks for `config.toml`, first at the path named by
//! the `VITALIS_CONFIG_PATH` environment variable and otherwise in the
//! application config directory. A missing file yields [`CoreConfig::default`].
//! Whatever is loaded then passes through validation, which normalizes the
//! logging settings and checks the notification engine constraints.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as vitalis_fs;
use crate::utils::paths::{get_app_config_dir, get_app_state_dir};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "VITALIS_CONFIG_PATH";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates the configuration from its default location.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let path = match env::var_os(CONFIG_PATH_ENV) {
            Some(p) => PathBuf::from(p),
            None => get_app_config_dir()?.join(CONFIG_FILE_NAME),
        };
        Self::load_from_path(&path)
    }

    /// Loads and validates the configuration stored at `path`.
    ///
    /// A missing or empty file produces the default configuration.
    pub fn load_from_path(path: &Path) -> Result<CoreConfig, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loaded configuration file {:?}", path);
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration file at {:?}, using defaults", path);
                let mut config = CoreConfig::default();
                Self::validate_config(&mut config)?;
                Ok(config)
            }
            Err(e) => Err(CoreError::Config(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })),
        }
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<CoreConfig, CoreError> {
        let mut config = if content.trim().is_empty() {
            CoreConfig::default()
        } else {
            toml::from_str(content).map_err(|e| CoreError::Config(ConfigError::ParseError(e)))?
        };
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Validates the configuration and resolves relative paths.
    ///
    /// - log level must be one of trace/debug/info/warn/error, and is lower-cased;
    /// - log format must be text/json, and is lower-cased;
    /// - a relative log file path is made absolute against the app state directory;
    /// - `sweep_interval_secs` and `event_channel_capacity` must be non-zero;
    /// - the two storage keys must be non-empty and distinct.
    fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level_lower,
            _ => {
                return Err(CoreError::Config(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                ))));
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => config.logging.format = format_lower,
            _ => {
                return Err(CoreError::Config(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                ))));
            }
        }

        if let Some(log_path) = &config.logging.file_path {
            let absolute_path = if log_path.is_absolute() {
                log_path.clone()
            } else {
                get_app_state_dir()?.join(log_path)
            };
            if let Some(parent_dir) = absolute_path.parent() {
                if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                    vitalis_fs::ensure_dir_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute_path);
        }

        let engine = &config.notifications;
        if engine.sweep_interval_secs == 0 {
            return Err(CoreError::Config(ConfigError::ValidationError(
                "notifications.sweep_interval_secs must be greater than zero.".to_string(),
            )));
        }
        if engine.event_channel_capacity == 0 {
            return Err(CoreError::Config(ConfigError::ValidationError(
                "notifications.event_channel_capacity must be greater than zero.".to_string(),
            )));
        }
        if engine.notifications_key.trim().is_empty() || engine.preferences_key.trim().is_empty() {
            return Err(CoreError::Config(ConfigError::ValidationError(
                "notifications storage keys must not be empty.".to_string(),
            )));
        }
        if engine.notifications_key == engine.preferences_key {
            return Err(CoreError::Config(ConfigError::ValidationError(format!(
                "notifications_key and preferences_key must differ (both are '{}').",
                engine.notifications_key
            ))));
        }

        Ok(())
    }
}
