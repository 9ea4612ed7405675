use async_trait::async_trait;

use super::errors::NotificationError;

/// Minimal durable storage the engine needs: opaque blobs under string keys.
///
/// A file directory, an embedded database or a remote store can all back it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, NotificationError>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), NotificationError>;

    /// Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), NotificationError>;
}
