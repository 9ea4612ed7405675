use thiserror::Error;
use vitalis_core::CoreError;

/// Errors raised inside the notification engine.
///
/// None of these reach producers from the mutation API: storage failures are
/// logged and swallowed, and operations on unknown ids are no-ops. They surface
/// from the persistence layer, from configuration parsing and from
/// constructors that touch the filesystem.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Storage operation '{operation}' failed for key '{key}': {message}")]
    Storage {
        operation: String,
        key: String,
        message: String,
        #[source]
        source: Option<CoreError>,
    },

    #[error("Failed to (de)serialize record '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal notification engine error: {0}")]
    Internal(String),
}

impl NotificationError {
    pub fn storage(
        operation: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        NotificationError::Storage {
            operation: operation.into(),
            key: key.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NotificationError::InvalidInput { field: field.into(), reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_messages_display() {
        assert_eq!(
            format!("{}", NotificationError::storage("set", "notifications", "quota exceeded")),
            "Storage operation 'set' failed for key 'notifications': quota exceeded"
        );
        let invalid = NotificationError::invalid_input("quiet_hours.start_time", "expected HH:MM");
        assert_eq!(
            format!("{}", invalid),
            "Invalid input for 'quiet_hours.start_time': expected HH:MM"
        );

        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err =
            NotificationError::Serialization { key: "preferences".to_string(), source: json_err };
        assert!(format!("{}", err).starts_with("Failed to (de)serialize record 'preferences':"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_storage_error_with_core_source() {
        let core = CoreError::Filesystem {
            message: "Failed to read file".to_string(),
            path: std::path::PathBuf::from("notifications.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let err = NotificationError::Storage {
            operation: "get".to_string(),
            key: "notifications".to_string(),
            message: "read failed".to_string(),
            source: Some(core),
        };
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("Filesystem Error: Failed to read file (Path: \"notifications.json\")".to_string())
        );
    }
}
