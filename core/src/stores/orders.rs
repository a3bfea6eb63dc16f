// campus-eats/src/stores/orders.rs

use crate::config::TransitionPolicy;
use crate::error::{AppError, Result};
use crate::models::{Order, OrderStatus};
use crate::persistence::{KeyValueStore, PersistedSlot, ORDERS_KEY};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, error, info, instrument, warn};

/// Append-only order history, newest first, persisted under `orders`.
///
/// Subscribers receive a revision number that increases on every change.
#[derive(Clone)]
pub struct OrderHistoryStore {
  orders: Arc<RwLock<Vec<Order>>>,
  slot: PersistedSlot<Vec<Order>>,
  policy: TransitionPolicy,
  persist_lock: Arc<AsyncMutex<()>>,
  revision_tx: Arc<watch::Sender<u64>>,
}

impl OrderHistoryStore {
  pub fn new(storage: Arc<dyn KeyValueStore>, policy: TransitionPolicy) -> Self {
    let (revision_tx, _rx) = watch::channel(0);
    Self {
      orders: Arc::new(RwLock::new(Vec::new())),
      slot: PersistedSlot::new(storage, ORDERS_KEY),
      policy,
      persist_lock: Arc::new(AsyncMutex::new(())),
      revision_tx: Arc::new(revision_tx),
    }
  }

  pub fn policy(&self) -> TransitionPolicy {
    self.policy
  }

  /// Loads the persisted history. Failures are logged and leave it empty.
  #[instrument(name = "OrderHistoryStore::restore", skip(self))]
  pub async fn restore(&self) -> usize {
    match self.slot.load().await {
      Ok(Some(orders)) => {
        let restored = orders.len();
        *self.orders.write() = orders;
        self.bump_revision();
        debug!(orders = restored, "Order history restored.");
        restored
      }
      Ok(None) => 0,
      Err(e) => {
        error!(error = %e, "Error loading orders.");
        0
      }
    }
  }

  #[instrument(name = "OrderHistoryStore::add_order", skip(self, order), fields(order_id = %order.id))]
  pub async fn add_order(&self, order: Order) {
    self.orders.write().insert(0, order);
    info!("Order added to history.");
    self.commit().await;
  }

  /// Returns `Ok(false)` when no order has that id.
  ///
  /// Under [`TransitionPolicy::Enforced`], writing the current status again is
  /// accepted as a no-op and any move off the pickup lifecycle is rejected.
  #[instrument(name = "OrderHistoryStore::update_order_status", skip(self), err(Display))]
  pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<bool> {
    {
      let mut orders = self.orders.write();
      let Some(order) = orders.iter_mut().find(|o| o.id == order_id) else {
        warn!("Status update for unknown order ignored.");
        return Ok(false);
      };

      if self.policy == TransitionPolicy::Enforced
        && order.status != status
        && !order.status.can_transition_to(status)
      {
        return Err(AppError::InvalidTransition {
          order_id: order_id.to_string(),
          from: order.status,
          to: status,
        });
      }

      debug!(from = %order.status, to = %status, "Order status updated.");
      order.status = status;
    }
    self.commit().await;
    Ok(true)
  }

  pub fn get_order_by_id(&self, order_id: &str) -> Option<Order> {
    self.orders.read().iter().find(|o| o.id == order_id).cloned()
  }

  pub fn orders(&self) -> Vec<Order> {
    self.orders.read().clone()
  }

  pub fn active_orders(&self) -> Vec<Order> {
    self.filtered(|o| o.status.is_active())
  }

  pub fn past_orders(&self) -> Vec<Order> {
    self.filtered(|o| !o.status.is_active())
  }

  pub fn len(&self) -> usize {
    self.orders.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.orders.read().is_empty()
  }

  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.revision_tx.subscribe()
  }

  fn filtered(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
    self.orders.read().iter().filter(|o| keep(o)).cloned().collect()
  }

  fn bump_revision(&self) {
    self.revision_tx.send_modify(|revision| *revision += 1);
  }

  async fn commit(&self) {
    let _persist_guard = self.persist_lock.lock().await;
    let snapshot = self.orders.read().clone();
    self.bump_revision();

    if let Err(e) = self.slot.save(&snapshot).await {
      error!(error = %e, key = self.slot.key(), "Error saving orders.");
    }
  }
}
