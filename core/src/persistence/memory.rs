// campus-eats/src/persistence/memory.rs

use super::{KeyValueStore, PersistenceError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Process-local storage. Used for tests and for the `memory` backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Raw value currently stored under `key`, bypassing the async interface.
  pub fn raw(&self, key: &str) -> Option<String> {
    self.entries.lock().get(key).cloned()
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
  async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
    Ok(self.entries.lock().get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
    self.entries.lock().insert(key.to_string(), value);
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
    self.entries.lock().remove(key);
    Ok(())
  }

  fn backend_name(&self) -> &'static str {
    "memory"
  }
}
