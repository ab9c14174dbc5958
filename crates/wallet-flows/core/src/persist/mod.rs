pub(crate) mod sqlite;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use thiserror::Error;

pub use sqlite::SqliteStorage;

use crate::onboarding::OnboardingProgress;

const ONBOARDING_KEY: &str = "onboarding";
const ONBOARDED_VALUE: &str = "onboarded";

/// Errors that can occur during storage operations
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Underlying implementation error: {0}")]
    Implementation(String),

    /// Database initialization error
    #[error("Failed to initialize database: {0}")]
    InitializationError(String),

    #[error("Failed to serialize/deserialize data: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Trait for persistent key-value storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    async fn delete_cached_item(&self, key: String) -> Result<(), StorageError>;
    async fn get_cached_item(&self, key: String) -> Result<Option<String>, StorageError>;
    async fn set_cached_item(&self, key: String, value: String) -> Result<(), StorageError>;
}

/// Volatile storage, lost when the process exits
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn delete_cached_item(&self, key: String) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }

    async fn get_cached_item(&self, key: String) -> Result<Option<String>, StorageError> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned())
    }

    async fn set_cached_item(&self, key: String, value: String) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
        Ok(())
    }
}

pub(crate) struct ObjectCacheRepository {
    storage: Arc<dyn Storage>,
}

impl ObjectCacheRepository {
    pub(crate) fn new(storage: Arc<dyn Storage>) -> Self {
        ObjectCacheRepository { storage }
    }

    /// Writes the onboarded marker. The marker is never cleared.
    pub(crate) async fn mark_onboarded(&self) -> Result<(), StorageError> {
        self.storage
            .set_cached_item(ONBOARDING_KEY.to_string(), ONBOARDED_VALUE.to_string())
            .await
    }

    /// Any value other than the onboarded marker counts as not started
    pub(crate) async fn fetch_onboarding_progress(
        &self,
    ) -> Result<OnboardingProgress, StorageError> {
        let value = self
            .storage
            .get_cached_item(ONBOARDING_KEY.to_string())
            .await?;
        Ok(match value.as_deref() {
            Some(ONBOARDED_VALUE) => OnboardingProgress::Onboarded,
            _ => OnboardingProgress::NotStarted,
        })
    }
}
