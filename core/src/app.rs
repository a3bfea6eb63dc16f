// campus-eats/src/app.rs

//! Startup wiring: pick the storage backend, build the stores, restore them.

use crate::config::{AppConfig, StorageBackend};
use crate::error::Result;
use crate::flows::CheckoutService;
use crate::persistence::{FileStore, KeyValueStore, MemoryStore};
use crate::stores::{CartStore, OrderHistoryStore, SessionStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// Every store, restored and ready. Hand the individual handles to whatever
/// needs them.
#[derive(Clone)]
pub struct AppStores {
  pub config: Arc<AppConfig>,
  pub storage: Arc<dyn KeyValueStore>,
  pub session: SessionStore,
  pub cart: CartStore,
  pub orders: OrderHistoryStore,
  pub checkout: CheckoutService,
}

/// Counts of what `restore` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
  pub signed_in: bool,
  pub cart_lines: usize,
  pub orders: usize,
}

impl AppStores {
  /// Opens the configured backend, then builds and restores every store.
  #[instrument(name = "AppStores::initialize", skip_all, fields(backend = ?config.storage_backend), err(Display))]
  pub async fn initialize(config: AppConfig) -> Result<(Self, RestoreReport)> {
    let storage = open_storage(&config).await?;
    let stores = Self::with_storage(config, storage);
    let report = stores.restore().await;
    Ok((stores, report))
  }

  /// Builds the stores over an existing backend without restoring them.
  pub fn with_storage(config: AppConfig, storage: Arc<dyn KeyValueStore>) -> Self {
    let session = SessionStore::new(Arc::clone(&storage), config.email_policy.clone(), config.latency);
    let cart = CartStore::new(Arc::clone(&storage));
    let orders = OrderHistoryStore::new(Arc::clone(&storage), config.transition_policy);
    let checkout = CheckoutService::new(
      cart.clone(),
      orders.clone(),
      config.checkout.clone(),
      config.latency.checkout,
    );

    Self {
      config: Arc::new(config),
      storage,
      session,
      cart,
      orders,
      checkout,
    }
  }

  /// Loads each store's key once. Never fails; see the individual stores.
  pub async fn restore(&self) -> RestoreReport {
    let (user, cart_lines, orders) = tokio::join!(self.session.restore(), self.cart.restore(), self.orders.restore());
    let report = RestoreReport {
      signed_in: user.is_some(),
      cart_lines,
      orders,
    };
    info!(
      backend = self.storage.backend_name(),
      signed_in = report.signed_in,
      cart_lines = report.cart_lines,
      orders = report.orders,
      "Stores restored."
    );
    report
  }
}

pub async fn open_storage(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
  let storage: Arc<dyn KeyValueStore> = match config.storage_backend {
    StorageBackend::Memory => Arc::new(MemoryStore::new()),
    StorageBackend::File => Arc::new(FileStore::open(&config.data_dir).await?),
  };
  Ok(storage)
}
