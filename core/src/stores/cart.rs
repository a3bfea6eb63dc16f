// campus-eats/src/stores/cart.rs

//! The single-merchant cart.
//!
//! [`Cart`] holds the pure mutation rules and needs no runtime; [`CartStore`]
//! is the shared handle that applies them, persists the full line list under
//! the `cart` key and publishes a [`CartSummary`] to subscribers.

use crate::models::CartLine;
use crate::persistence::{KeyValueStore, PersistedSlot, CART_KEY};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, error, instrument, warn};

/// What `add_item` should do when the cart belongs to another merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMerchantConflict {
  /// Leave the cart alone and report the conflict so the caller can ask the user.
  Ask,
  /// The user confirmed: drop the current cart and start over with the new line.
  Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddItemOutcome {
  Added,
  Incremented { quantity: u32 },
  Replaced,
  /// Nothing was added: unit prices may not be negative.
  NegativePrice { price: Decimal },
  MerchantConflict {
    current_merchant_id: String,
    current_merchant_name: String,
    incoming_merchant_name: String,
  },
}

impl AddItemOutcome {
  pub fn needs_confirmation(&self) -> bool {
    matches!(self, AddItemOutcome::MerchantConflict { .. })
  }

  /// Whether the cart was modified.
  pub fn changed(&self) -> bool {
    matches!(
      self,
      AddItemOutcome::Added | AddItemOutcome::Incremented { .. } | AddItemOutcome::Replaced
    )
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSummary {
  pub item_count: u32,
  pub total: Decimal,
  pub merchant_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
  lines: Vec<CartLine>,
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Rebuilds a cart from persisted lines, dropping anything that breaks the
  /// cart's invariants (zero quantities, negative prices, lines from a second merchant).
  pub fn from_lines(lines: Vec<CartLine>) -> Self {
    let mut cart = Cart::new();
    for line in lines {
      if line.quantity < 1 {
        warn!(item_id = %line.id, "Dropping persisted cart line with zero quantity.");
        continue;
      }
      if line.price < Decimal::ZERO {
        warn!(item_id = %line.id, price = %line.price, "Dropping persisted cart line with negative price.");
        continue;
      }
      if let Some((merchant_id, _)) = cart.merchant() {
        if merchant_id != line.merchant_id {
          warn!(item_id = %line.id, merchant_id = %line.merchant_id, "Dropping persisted cart line from a second merchant.");
          continue;
        }
      }
      cart.lines.push(line);
    }
    cart
  }

  pub fn lines(&self) -> &[CartLine] {
    &self.lines
  }

  pub fn into_lines(self) -> Vec<CartLine> {
    self.lines
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn contains(&self, item_id: &str) -> bool {
    self.lines.iter().any(|l| l.id == item_id)
  }

  /// `(merchant_id, merchant_name)` of the cart's owner, if it has any lines.
  pub fn merchant(&self) -> Option<(&str, &str)> {
    self
      .lines
      .first()
      .map(|l| (l.merchant_id.as_str(), l.merchant_name.as_str()))
  }

  pub fn total(&self) -> Decimal {
    self.lines.iter().map(CartLine::line_total).sum()
  }

  /// Saturates at `u32::MAX`.
  pub fn item_count(&self) -> u32 {
    self.lines.iter().fold(0u32, |count, l| count.saturating_add(l.quantity))
  }

  pub fn summary(&self) -> CartSummary {
    CartSummary {
      item_count: self.item_count(),
      total: self.total(),
      merchant_id: self.merchant().map(|(id, _)| id.to_string()),
    }
  }

  /// Adds one unit of `line`. The quantity carried by `line` is ignored.
  pub fn add_item(&mut self, mut line: CartLine, on_conflict: OnMerchantConflict) -> AddItemOutcome {
    if line.price < Decimal::ZERO {
      return AddItemOutcome::NegativePrice { price: line.price };
    }
    line.quantity = 1;

    let conflicting = self
      .lines
      .iter()
      .find(|existing| existing.merchant_id != line.merchant_id);
    if let Some(existing) = conflicting {
      return match on_conflict {
        OnMerchantConflict::Ask => AddItemOutcome::MerchantConflict {
          current_merchant_id: existing.merchant_id.clone(),
          current_merchant_name: existing.merchant_name.clone(),
          incoming_merchant_name: line.merchant_name,
        },
        OnMerchantConflict::Replace => {
          self.lines = vec![line];
          AddItemOutcome::Replaced
        }
      };
    }

    if let Some(existing) = self.lines.iter_mut().find(|existing| existing.id == line.id) {
      existing.quantity = existing.quantity.saturating_add(1);
      return AddItemOutcome::Incremented {
        quantity: existing.quantity,
      };
    }

    self.lines.push(line);
    AddItemOutcome::Added
  }

  /// Returns whether a line was removed.
  pub fn remove_item(&mut self, item_id: &str) -> bool {
    let before = self.lines.len();
    self.lines.retain(|l| l.id != item_id);
    self.lines.len() != before
  }

  /// A quantity below one removes the line. Returns whether anything changed.
  pub fn update_quantity(&mut self, item_id: &str, quantity: u32) -> bool {
    if quantity < 1 {
      return self.remove_item(item_id);
    }
    match self.lines.iter_mut().find(|l| l.id == item_id) {
      Some(line) if line.quantity != quantity => {
        line.quantity = quantity;
        true
      }
      _ => false,
    }
  }

  pub fn clear(&mut self) {
    self.lines.clear();
  }
}

/// Shared handle to the cart. Clones see the same cart.
#[derive(Clone)]
pub struct CartStore {
  state: Arc<RwLock<Cart>>,
  slot: PersistedSlot<Vec<CartLine>>,
  // Serializes writes to storage so the last one always carries the latest cart.
  persist_lock: Arc<AsyncMutex<()>>,
  summary_tx: Arc<watch::Sender<CartSummary>>,
}

impl CartStore {
  pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
    let (summary_tx, _rx) = watch::channel(CartSummary::default());
    Self {
      state: Arc::new(RwLock::new(Cart::new())),
      slot: PersistedSlot::new(storage, CART_KEY),
      persist_lock: Arc::new(AsyncMutex::new(())),
      summary_tx: Arc::new(summary_tx),
    }
  }

  /// Loads the persisted cart. Failures are logged and leave the cart empty.
  /// Returns the number of lines restored.
  #[instrument(name = "CartStore::restore", skip(self))]
  pub async fn restore(&self) -> usize {
    let lines = match self.slot.load().await {
      Ok(Some(lines)) => lines,
      Ok(None) => {
        debug!("No persisted cart found.");
        return 0;
      }
      Err(e) => {
        error!(error = %e, "Error loading cart.");
        return 0;
      }
    };

    let cart = Cart::from_lines(lines);
    let restored = cart.lines().len();
    let summary = cart.summary();
    *self.state.write() = cart;
    self.summary_tx.send_replace(summary);
    debug!(lines = restored, "Cart restored.");
    restored
  }

  #[instrument(name = "CartStore::add_item", skip(self, line), fields(item_id = %line.id, merchant_id = %line.merchant_id))]
  pub async fn add_item(&self, line: CartLine, on_conflict: OnMerchantConflict) -> AddItemOutcome {
    let outcome = self.state.write().add_item(line, on_conflict);
    if !outcome.changed() {
      debug!(?outcome, "Cart left unchanged.");
      return outcome;
    }
    self.commit().await;
    outcome
  }

  #[instrument(name = "CartStore::remove_item", skip(self))]
  pub async fn remove_item(&self, item_id: &str) {
    let removed = self.state.write().remove_item(item_id);
    debug!(removed, "Remove item applied.");
    self.commit().await;
  }

  #[instrument(name = "CartStore::update_quantity", skip(self))]
  pub async fn update_quantity(&self, item_id: &str, quantity: u32) {
    self.state.write().update_quantity(item_id, quantity);
    self.commit().await;
  }

  #[instrument(name = "CartStore::clear_cart", skip(self))]
  pub async fn clear_cart(&self) {
    self.state.write().clear();
    self.commit().await;
  }

  pub fn lines(&self) -> Vec<CartLine> {
    self.state.read().lines().to_vec()
  }

  pub fn is_empty(&self) -> bool {
    self.state.read().is_empty()
  }

  pub fn total(&self) -> Decimal {
    self.state.read().total()
  }

  pub fn item_count(&self) -> u32 {
    self.state.read().item_count()
  }

  pub fn merchant(&self) -> Option<(String, String)> {
    self
      .state
      .read()
      .merchant()
      .map(|(id, name)| (id.to_string(), name.to_string()))
  }

  pub fn summary(&self) -> CartSummary {
    self.state.read().summary()
  }

  pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
    self.summary_tx.subscribe()
  }

  /// Persists the whole cart and notifies subscribers. Storage failures are
  /// logged only: the in-memory cart is already updated.
  async fn commit(&self) {
    let _persist_guard = self.persist_lock.lock().await;
    let (lines, summary) = {
      let cart = self.state.read();
      (cart.lines().to_vec(), cart.summary())
    };
    self.summary_tx.send_replace(summary);

    if let Err(e) = self.slot.save(&lines).await {
      error!(error = %e, key = self.slot.key(), "Error saving cart.");
    }
  }
}
