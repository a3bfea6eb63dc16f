// campus-eats/src/flows/checkout.rs

//! Turns the live cart into a placed order.
//!
//! The cart is frozen into an [`Order`] before the simulated processing delay,
//! so edits made while the order is "processing" never reach the placed order.

use crate::config::CheckoutSettings;
use crate::core::{ContextData, PipelineControl, SkipCondition};
use crate::error::{AppError, Result};
use crate::models::{CartLine, Order, OrderLine, OrderStatus, PaymentMethod};
use crate::pipeline::Pipeline;
use crate::stores::session::simulate_latency;
use crate::stores::{CartStore, OrderHistoryStore};
use chrono::{Local, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckoutRequest {
  pub payment_method: PaymentMethod,
}

/// The order summary shown before placing: subtotal, fee and what will be charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutQuote {
  pub subtotal: Decimal,
  pub service_fee: Decimal,
  pub total: Decimal,
}

impl CheckoutQuote {
  pub fn new(subtotal: Decimal, service_fee: Decimal) -> Self {
    Self {
      subtotal,
      service_fee,
      total: subtotal + service_fee,
    }
  }
}

/// Underlying data for the checkout pipeline.
pub struct CheckoutCtxData {
  pub cart: CartStore,
  pub orders: OrderHistoryStore,
  pub settings: CheckoutSettings,
  pub processing_delay: Duration,
  pub payment_method: PaymentMethod,
  pub frozen_lines: Vec<CartLine>,
  pub order: Option<Order>,
}

#[derive(Clone)]
pub struct CheckoutService {
  cart: CartStore,
  orders: OrderHistoryStore,
  settings: CheckoutSettings,
  processing_delay: Duration,
  pipeline: Arc<Pipeline<CheckoutCtxData, AppError>>,
}

impl CheckoutService {
  pub fn new(
    cart: CartStore,
    orders: OrderHistoryStore,
    settings: CheckoutSettings,
    processing_delay: Duration,
  ) -> Self {
    Self {
      cart,
      orders,
      settings,
      processing_delay,
      pipeline: Arc::new(checkout_pipeline()),
    }
  }

  pub fn settings(&self) -> &CheckoutSettings {
    &self.settings
  }

  pub fn quote(&self) -> CheckoutQuote {
    CheckoutQuote::new(self.cart.total(), self.settings.service_fee)
  }

  /// Places the current cart as an order and empties the cart.
  ///
  /// Fails with [`AppError::EmptyCart`] when there is nothing to order.
  #[instrument(name = "CheckoutService::place_order", skip(self), err(Display))]
  pub async fn place_order(&self, request: CheckoutRequest) -> Result<Order> {
    let ctx_data = ContextData::new(CheckoutCtxData {
      cart: self.cart.clone(),
      orders: self.orders.clone(),
      settings: self.settings.clone(),
      processing_delay: self.processing_delay,
      payment_method: request.payment_method,
      frozen_lines: Vec::new(),
      order: None,
    });

    self.pipeline.run(ctx_data.clone()).await?;

    let order = ctx_data.read().order.clone();
    order.ok_or_else(|| AppError::Internal("Checkout finished without an order".to_string()))
  }
}

pub fn checkout_pipeline() -> Pipeline<CheckoutCtxData, AppError> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(
    "checkout",
    &[
      ("validate_cart_checkout", false, None),
      ("freeze_order_checkout", false, None),
      ("simulate_processing_checkout", false, Some(skip_without_delay())),
      ("record_order_checkout", false, None),
      ("clear_cart_checkout", false, None),
    ],
  );

  // Step 1: Snapshot the cart; an empty cart cannot be ordered.
  p.on_root("validate_cart_checkout", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let lines = { ctx_data.read().cart.lines() };
    if lines.is_empty() {
      warn!("Checkout attempted with an empty cart.");
      return Err(AppError::EmptyCart);
    }
    ctx_data.write().frozen_lines = lines;
    Ok(PipelineControl::Continue)
  });

  // Step 2: Build the order from the frozen lines plus the service fee.
  p.on_root("freeze_order_checkout", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let mut guard = ctx_data.write();
    let order = build_order(&guard.frozen_lines, &guard.settings, guard.payment_method)?;
    info!(order_id = %order.id, total = %order.total, "Order frozen from cart.");
    guard.order = Some(order);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  // Step 3: Stand-in for talking to the merchant.
  p.on_root("simulate_processing_checkout", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let delay = ctx_data.read().processing_delay;
    simulate_latency(delay).await;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  // Step 4: Record in history.
  p.on_root("record_order_checkout", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let (orders, order) = {
      let guard = ctx_data.read();
      (guard.orders.clone(), guard.order.clone())
    };
    let Some(order) = order else {
      error!("Order missing at record step. Pipeline logic error.");
      return Err(AppError::Internal("Order unexpectedly missing at record step".to_string()));
    };
    orders.add_order(order).await;
    Ok(PipelineControl::Continue)
  });

  // Step 5: Empty the cart.
  p.on_root("clear_cart_checkout", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let cart = ctx_data.read().cart.clone();
    cart.clear_cart().await;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p
}

fn skip_without_delay() -> SkipCondition<CheckoutCtxData> {
  Arc::new(|ctx_data: &ContextData<CheckoutCtxData>| ctx_data.read().processing_delay.is_zero())
}

fn build_order(lines: &[CartLine], settings: &CheckoutSettings, payment_method: PaymentMethod) -> Result<Order> {
  let first = lines.first().ok_or(AppError::EmptyCart)?;
  let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();

  Ok(Order {
    id: new_order_id(),
    merchant_id: first.merchant_id.clone(),
    merchant_name: first.merchant_name.clone(),
    items: lines.iter().map(OrderLine::from).collect(),
    status: OrderStatus::Preparing,
    total: CheckoutQuote::new(subtotal, settings.service_fee).total,
    date: Local::now().format("%-d %b %Y, %H:%M").to_string(),
    estimated_pickup: settings.estimated_pickup.clone(),
    location: settings.pickup_location.clone(),
    payment_method,
  })
}

/// `ord-<unix millis>-<8 hex>`: time-ordered, unique within a millisecond.
fn new_order_id() -> String {
  let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
  format!("ord-{}-{}", Utc::now().timestamp_millis(), suffix)
}
