use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use vitalis_core::utils::fs as vitalis_fs;
use vitalis_core::CoreError;

use super::errors::NotificationError;
use super::persistence_iface::KeyValueStore;
use super::preferences::NotificationPreferences;
use super::types::Notification;

// --- InMemoryKeyValueStore ---

#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Default::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, NotificationError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), NotificationError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), NotificationError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// --- FilesystemKeyValueStore ---

/// One `<key>.json` file per key inside a directory. Writes go through a
/// temporary file and a rename.
#[derive(Debug, Clone)]
pub struct FilesystemKeyValueStore {
    directory: PathBuf,
}

impl FilesystemKeyValueStore {
    /// Creates the directory if needed.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, NotificationError> {
        let directory = directory.into();
        vitalis_fs::ensure_dir_exists(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Keys are file stems, so only `[A-Za-z0-9_-]` is accepted.
    fn path_for(&self, key: &str) -> Result<PathBuf, NotificationError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(NotificationError::invalid_input(
                "key",
                format!("'{}' must be non-empty and contain only letters, digits, '_' or '-'", key),
            ));
        }
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

async fn run_blocking<T, F>(operation: &str, key: &str, f: F) -> Result<T, NotificationError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| NotificationError::Storage {
            operation: operation.to_string(),
            key: key.to_string(),
            message: "filesystem operation failed".to_string(),
            source: Some(e),
        }),
        Err(join_err) => Err(NotificationError::Internal(format!(
            "Blocking {} task for key '{}' failed: {}",
            operation, key, join_err
        ))),
    }
}

#[async_trait]
impl KeyValueStore for FilesystemKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, NotificationError> {
        let path = self.path_for(key)?;
        run_blocking("get", key, move || match vitalis_fs::read_bytes(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), NotificationError> {
        let path = self.path_for(key)?;
        run_blocking("set", key, move || vitalis_fs::write_atomic(&path, &value)).await
    }

    async fn delete(&self, key: &str) -> Result<(), NotificationError> {
        let path = self.path_for(key)?;
        run_blocking("delete", key, move || vitalis_fs::remove_file_if_exists(&path)).await
    }
}

// --- NotificationPersistence ---

/// Serializes the notification list and the preferences under two keys.
///
/// The `load_*` methods never fail: a missing, unreadable or corrupt record
/// yields an empty list or default preferences and is logged. `try_load_*`
/// expose the underlying error instead.
#[derive(Clone)]
pub struct NotificationPersistence {
    store: Arc<dyn KeyValueStore>,
    notifications_key: String,
    preferences_key: String,
}

impl std::fmt::Debug for NotificationPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationPersistence")
            .field("notifications_key", &self.notifications_key)
            .field("preferences_key", &self.preferences_key)
            .finish()
    }
}

impl NotificationPersistence {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        notifications_key: impl Into<String>,
        preferences_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifications_key: notifications_key.into(),
            preferences_key: preferences_key.into(),
        }
    }

    pub async fn save_notifications(
        &self,
        notifications: &[Notification],
    ) -> Result<(), NotificationError> {
        let bytes = serde_json::to_vec(notifications).map_err(|e| NotificationError::Serialization {
            key: self.notifications_key.clone(),
            source: e,
        })?;
        self.store.set(&self.notifications_key, bytes).await?;
        debug!(
            "Persisted {} notifications under '{}'",
            notifications.len(),
            self.notifications_key
        );
        Ok(())
    }

    pub async fn try_load_notifications(
        &self,
    ) -> Result<Option<Vec<Notification>>, NotificationError> {
        let Some(bytes) = self.store.get(&self.notifications_key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| NotificationError::Serialization {
            key: self.notifications_key.clone(),
            source: e,
        })
    }

    pub async fn load_notifications(&self) -> Vec<Notification> {
        match self.try_load_notifications().await {
            Ok(Some(list)) => {
                debug!("Loaded {} notifications from '{}'", list.len(), self.notifications_key);
                list
            }
            Ok(None) => {
                debug!("No stored notifications under '{}'", self.notifications_key);
                Vec::new()
            }
            Err(e) => {
                warn!("Falling back to an empty notification list: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn save_preferences(
        &self,
        preferences: &NotificationPreferences,
    ) -> Result<(), NotificationError> {
        let bytes = serde_json::to_vec(preferences).map_err(|e| NotificationError::Serialization {
            key: self.preferences_key.clone(),
            source: e,
        })?;
        self.store.set(&self.preferences_key, bytes).await?;
        debug!("Persisted preferences under '{}'", self.preferences_key);
        Ok(())
    }

    pub async fn try_load_preferences(
        &self,
    ) -> Result<Option<NotificationPreferences>, NotificationError> {
        let Some(bytes) = self.store.get(&self.preferences_key).await? else {
            return Ok(None);
        };
        let mut preferences: NotificationPreferences =
            serde_json::from_slice(&bytes).map_err(|e| NotificationError::Serialization {
                key: self.preferences_key.clone(),
                source: e,
            })?;
        if preferences.ensure_all_categories() {
            debug!("Completed stored preferences with default category entries");
        }
        Ok(Some(preferences))
    }

    pub async fn load_preferences(&self) -> NotificationPreferences {
        match self.try_load_preferences().await {
            Ok(Some(preferences)) => preferences,
            Ok(None) => {
                debug!("No stored preferences under '{}', using defaults", self.preferences_key);
                NotificationPreferences::default()
            }
            Err(e) => {
                warn!("Falling back to default preferences: {}", e);
                NotificationPreferences::default()
            }
        }
    }

    /// Deletes both records.
    pub async fn clear(&self) -> Result<(), NotificationError> {
        self.store.delete(&self.notifications_key).await?;
        self.store.delete(&self.preferences_key).await
    }
}
