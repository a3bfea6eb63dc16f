// campus-eats/src/models/cart_line.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One menu item staged in the cart. Persisted (as part of an array) under `cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub id: String,
  pub merchant_id: String,
  pub merchant_name: String,
  pub name: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub quantity: u32,
  pub image: String,
  #[serde(default)]
  pub options: Vec<String>,
}

impl CartLine {
  pub fn new(
    id: impl Into<String>,
    merchant_id: impl Into<String>,
    merchant_name: impl Into<String>,
    name: impl Into<String>,
    price: Decimal,
  ) -> Self {
    Self {
      id: id.into(),
      merchant_id: merchant_id.into(),
      merchant_name: merchant_name.into(),
      name: name.into(),
      price,
      quantity: 1,
      image: String::new(),
      options: Vec::new(),
    }
  }

  pub fn with_image(mut self, image: impl Into<String>) -> Self {
    self.image = image.into();
    self
  }

  pub fn with_options<I, S>(mut self, options: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.options = options.into_iter().map(Into::into).collect();
    self
  }

  pub fn line_total(&self) -> Decimal {
    self.price * Decimal::from(self.quantity)
  }
}
