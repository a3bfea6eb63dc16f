// campus-eats/src/flows/mod.rs

//! Multi-step operations expressed as pipelines: the mock sign-in / sign-up
//! round trips and checkout.

pub mod checkout;
pub mod session;

pub use checkout::{CheckoutQuote, CheckoutRequest, CheckoutService};
