// campus-eats/src/stores/mod.rs

//! The three client-side state stores. Each owns one persistence key and is a
//! cheap `Clone` handle over shared state.

pub mod cart;
pub mod orders;
pub mod session;

pub use cart::{AddItemOutcome, Cart, CartStore, CartSummary, OnMerchantConflict};
pub use orders::OrderHistoryStore;
pub use session::{Landing, SessionStore};
