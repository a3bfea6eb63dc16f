// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset.

use async_trait::async_trait;
use campus_eats::{
  AppConfig, AppStores, CartLine, FlowError, KeyValueStore, MemoryStore, PersistenceError,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;

pub const WITS: &str = "@students.wits.ac.za";

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---
pub fn student(local: &str) -> String {
  format!("{}{}", local, WITS)
}

pub fn grill_line(id: &str, name: &str, price: i64) -> CartLine {
  CartLine::new(id, "matrix-grill", "The Matrix Grill", name, Decimal::from(price)).with_image(format!("https://img.example/{}.jpg", id))
}

pub fn deli_line(id: &str, name: &str, price: i64) -> CartLine {
  CartLine::new(id, "jubilee-deli", "Jubilee Deli", name, Decimal::from(price))
}

/// Stores over `storage` with latency off, not yet restored.
pub fn stores_over(storage: Arc<dyn KeyValueStore>) -> AppStores {
  AppStores::with_storage(AppConfig::in_memory(), storage)
}

// --- Storage doubles ---

/// Wraps a `MemoryStore` and counts every call that reaches it.
#[derive(Default)]
pub struct CountingStore {
  pub inner: MemoryStore,
  pub gets: AtomicUsize,
  pub sets: AtomicUsize,
  pub deletes: AtomicUsize,
}

impl CountingStore {
  pub fn writes(&self) -> usize {
    self.sets.load(Ordering::SeqCst) + self.deletes.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl KeyValueStore for CountingStore {
  async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
    self.gets.fetch_add(1, Ordering::SeqCst);
    self.inner.get(key).await
  }

  async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
    self.sets.fetch_add(1, Ordering::SeqCst);
    self.inner.set(key, value).await
  }

  async fn delete(&self, key: &str) -> Result<(), PersistenceError> {
    self.deletes.fetch_add(1, Ordering::SeqCst);
    self.inner.delete(key).await
  }

  fn backend_name(&self) -> &'static str {
    "counting"
  }
}

/// Every operation fails, like a locked keychain.
#[derive(Default)]
pub struct FailingStore {
  pub attempts: AtomicUsize,
}

#[async_trait]
impl KeyValueStore for FailingStore {
  async fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    Err(PersistenceError::Backend("storage unavailable".to_string()))
  }

  async fn set(&self, _key: &str, _value: String) -> Result<(), PersistenceError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    Err(PersistenceError::Backend("storage unavailable".to_string()))
  }

  async fn delete(&self, _key: &str) -> Result<(), PersistenceError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    Err(PersistenceError::Backend("storage unavailable".to_string()))
  }

  fn backend_name(&self) -> &'static str {
    "failing"
  }
}

// --- Pipeline test context ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Flow error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}
