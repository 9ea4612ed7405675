//! Error module for the Vitalis domain layer.

use thiserror::Error;
use vitalis_core::CoreError;

use crate::notifications::NotificationError;

/// A general Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// The primary error type for the domain layer.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_wrapping() {
        let err: DomainError = NotificationError::Internal("lock poisoned".to_string()).into();
        assert_eq!(format!("{}", err), "Internal notification engine error: lock poisoned");

        let core = CoreError::LoggingInitialization("subscriber already set".to_string());
        let err: DomainError = core.into();
        assert_eq!(format!("{}", err), "Logging Initialization Failed: subscriber already set");
    }
}
