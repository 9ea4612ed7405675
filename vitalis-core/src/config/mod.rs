//! Configuration Management for Vitalis Core.
//!
//! - [`types`]: the schema ([`CoreConfig`], [`LoggingConfig`],
//!   [`NotificationEngineConfig`]).
//! - [`defaults`]: default values referenced by `#[serde(default = ...)]`.
//! - [`loader`]: [`ConfigLoader`], which locates, parses and validates the
//!   TOML file.
//!
//! A missing configuration file is not an error: the defaults are used.

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{CoreConfig, LoggingConfig, NotificationEngineConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults as config_defaults;

    #[test]
    fn test_core_config_default() {
        let config = CoreConfig::default();
        assert_eq!(config.logging.level, config_defaults::default_log_level());
        assert_eq!(config.logging.file_path, None);
        assert_eq!(config.notifications.sweep_interval_secs, 60);
    }

    #[test]
    fn test_core_config_deserialize_minimal() {
        let toml_data = "[logging]\nlevel = \"debug\"\n";
        let config: CoreConfig =
            toml::from_str(toml_data).expect("Failed to deserialize CoreConfig");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, config_defaults::default_log_format());
        assert_eq!(
            config.notifications.default_toast_duration_ms,
            config_defaults::default_toast_duration_ms()
        );
    }
}
