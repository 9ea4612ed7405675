//! Error handling for the Vitalis core layer.
//!
//! The main error type for this crate is [`CoreError`], which wraps the more
//! specific [`ConfigError`]. Domain crates wrap
//! `CoreError` in their own error enums rather than re-declaring I/O variants.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Vitalis.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// Errors that occur during the initialization of the logging system.
    #[error("Logging Initialization Failed: {0}")]
    LoggingInitialization(String),

    /// Errors related to filesystem operations, such as creating directories
    /// or reading files. Includes the path involved and the source I/O error.
    #[error("Filesystem Error: {message} (Path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    /// Returns `true` when the error denotes a missing file or directory.
    ///
    /// Persistence layers use this to distinguish "nothing stored yet" from a
    /// genuine read failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::Filesystem { source, .. } => source.kind() == io::ErrorKind::NotFound,
            CoreError::Config(ConfigError::ReadError { source, .. }) => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

/// Error type for configuration-related operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a configuration file failed.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML, or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed values are out of range or inconsistent.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A required base directory (e.g. XDG config/data home) could not be determined.
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },
}
