// campus-eats-app/src/walkthrough.rs

//! A scripted ordering session against the configured storage: sign in if
//! needed, fill a cart at one merchant, try another merchant, check out.

use anyhow::Context;
use campus_eats::{AddItemOutcome, AppStores, CartLine, CheckoutRequest, OnMerchantConflict, PaymentMethod};
use rust_decimal::Decimal;
use tracing::{info, warn};

pub async fn run(stores: &AppStores) -> anyhow::Result<()> {
  if !stores.session.is_signed_in() {
    let email = std::env::var("CAMPUS_EATS_DEMO_EMAIL")
      .unwrap_or_else(|_| format!("student{}", stores.config.email_policy.domain_suffix));
    let user = stores
      .session
      .sign_in(&email, "walkthrough")
      .await
      .with_context(|| format!("Sign-in failed for {}", email))?;
    info!(user_id = %user.id, "Signed in.");
  }

  let grill = |id: &str, name: &str, price: i64| {
    CartLine::new(id, "matrix-grill", "The Matrix Grill", name, Decimal::from(price))
  };
  stores.cart.add_item(grill("burger", "Classic Burger", 45), OnMerchantConflict::Ask).await;
  stores.cart.add_item(grill("burger", "Classic Burger", 45), OnMerchantConflict::Ask).await;
  stores.cart.add_item(grill("fries", "Large Fries", 25), OnMerchantConflict::Ask).await;

  let wrap = CartLine::new("wrap", "jubilee-deli", "Jubilee Deli", "Chicken Wrap", Decimal::from(60));
  if let AddItemOutcome::MerchantConflict {
    current_merchant_name,
    incoming_merchant_name,
    ..
  } = stores.cart.add_item(wrap, OnMerchantConflict::Ask).await
  {
    // The walkthrough declines: keep the existing cart.
    warn!(current = %current_merchant_name, incoming = %incoming_merchant_name, "Cart holds another merchant's items; keeping it.");
  }

  let quote = stores.checkout.quote();
  info!(subtotal = %quote.subtotal, service_fee = %quote.service_fee, total = %quote.total, "Checkout quote.");

  let order = stores
    .checkout
    .place_order(CheckoutRequest {
      payment_method: PaymentMethod::Card,
    })
    .await?;
  println!(
    "Placed {} at {}: {} item(s), R{} total, pickup at {}.",
    order.id,
    order.merchant_name,
    order.item_count(),
    order.total,
    order.location
  );
  Ok(())
}
