// campus-eats/src/models/order.rs

use super::CartLine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Preparing,
  Ready,
  Completed,
  Cancelled,
}

impl OrderStatus {
  /// Preparing and ready orders show under "active"; the rest under "past".
  pub fn is_active(self) -> bool {
    matches!(self, OrderStatus::Preparing | OrderStatus::Ready)
  }

  /// The pickup lifecycle: preparing → ready → completed, with cancellation
  /// possible from either non-terminal state.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Preparing, Ready) | (Ready, Completed) | (Preparing, Cancelled) | (Ready, Cancelled)
    )
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Preparing => "preparing",
      OrderStatus::Ready => "ready",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
  #[default]
  Card,
  Cash,
}

/// A frozen copy of a cart line at the time the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  pub id: String,
  pub name: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub quantity: u32,
  #[serde(default)]
  pub options: Vec<String>,
}

impl From<&CartLine> for OrderLine {
  fn from(line: &CartLine) -> Self {
    Self {
      id: line.id.clone(),
      name: line.name.clone(),
      price: line.price,
      quantity: line.quantity,
      options: line.options.clone(),
    }
  }
}

/// A placed order. Persisted (newest first) under `orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: String,
  pub merchant_id: String,
  pub merchant_name: String,
  pub items: Vec<OrderLine>,
  pub status: OrderStatus,
  #[serde(with = "rust_decimal::serde::float")]
  pub total: Decimal,
  pub date: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub estimated_pickup: Option<String>,
  pub location: String,
  // Older records predate the payment choice.
  #[serde(default)]
  pub payment_method: PaymentMethod,
}

impl Order {
  pub fn subtotal(&self) -> Decimal {
    self
      .items
      .iter()
      .map(|item| item.price * Decimal::from(item.quantity))
      .sum()
  }

  /// Saturates at `u32::MAX`.
  pub fn item_count(&self) -> u32 {
    self.items.iter().fold(0u32, |count, item| count.saturating_add(item.quantity))
  }
}
