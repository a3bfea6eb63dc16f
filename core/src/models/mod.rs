// campus-eats/src/models/mod.rs

//! Records owned by the stores and persisted as JSON.

pub mod cart_line;
pub mod order;
pub mod user;

pub use cart_line::CartLine;
pub use order::{Order, OrderLine, OrderStatus, PaymentMethod};
pub use user::{ProfilePatch, User};
