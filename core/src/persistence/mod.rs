// campus-eats/src/persistence/mod.rs

//! The key-value persistence collaborator shared by the stores.
//!
//! Each store owns exactly one key and goes through a [`PersistedSlot`], which
//! turns the raw `get/set/delete` string interface into typed JSON records.
//! Which backend sits underneath is decided once at startup from
//! [`AppConfig`](crate::config::AppConfig).

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const USER_KEY: &str = "user";
pub const CART_KEY: &str = "cart";
pub const ORDERS_KEY: &str = "orders";

#[derive(Debug, Error)]
pub enum PersistenceError {
  #[error("I/O failure on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not (de)serialize '{key}': {source}")]
  Serialization {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Storage backend error: {0}")]
  Backend(String),
}

/// String-keyed local storage. Implementations must be safe to share across tasks.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

  async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError>;

  /// Deleting a missing key is not an error.
  async fn delete(&self, key: &str) -> Result<(), PersistenceError>;

  /// Short label used in logs.
  fn backend_name(&self) -> &'static str;
}

/// A typed view of one key in a [`KeyValueStore`].
pub struct PersistedSlot<T> {
  storage: Arc<dyn KeyValueStore>,
  key: &'static str,
  _record: PhantomData<fn() -> T>,
}

impl<T> Clone for PersistedSlot<T> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      key: self.key,
      _record: PhantomData,
    }
  }
}

impl<T> PersistedSlot<T>
where
  T: Serialize + DeserializeOwned,
{
  pub fn new(storage: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
    Self {
      storage,
      key,
      _record: PhantomData,
    }
  }

  pub fn key(&self) -> &'static str {
    self.key
  }

  /// `Ok(None)` when the key is absent or holds an empty string.
  pub async fn load(&self) -> Result<Option<T>, PersistenceError> {
    let Some(raw) = self.storage.get(self.key).await? else {
      return Ok(None);
    };
    if raw.trim().is_empty() {
      return Ok(None);
    }
    serde_json::from_str(&raw)
      .map(Some)
      .map_err(|source| PersistenceError::Serialization {
        key: self.key.to_string(),
        source,
      })
  }

  pub async fn save(&self, record: &T) -> Result<(), PersistenceError> {
    let raw = serde_json::to_string(record).map_err(|source| PersistenceError::Serialization {
      key: self.key.to_string(),
      source,
    })?;
    self.storage.set(self.key, raw).await
  }

  pub async fn clear(&self) -> Result<(), PersistenceError> {
    self.storage.delete(self.key).await
  }
}
