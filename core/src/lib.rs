// campus-eats/src/lib.rs

//! campus-eats: the client-side state layer of a campus food-ordering app.
//!
//! Three independent stores, each persisted under its own key in a pluggable
//! key-value backend:
//!  - [`SessionStore`]: the signed-in student (mock institutional sign-in).
//!  - [`CartStore`]: a single-merchant cart with derived totals.
//!  - [`OrderHistoryStore`]: placed orders, newest first.
//!
//! [`CheckoutService`] moves a cart into the order history. Sign-in, sign-up
//! and checkout run as named-step [`Pipeline`]s over shared [`ContextData`].
//!
//! Typical startup:
//!  1. `AppConfig::from_env()` (or `AppConfig::in_memory()` in tests).
//!  2. `AppStores::initialize(config).await` opens storage and restores all stores.
//!  3. Pass `stores.cart`, `stores.session`, ... to whatever needs them.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod flows;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod stores;

pub use crate::app::{AppStores, RestoreReport};
pub use crate::config::{AppConfig, CheckoutSettings, EmailPolicy, SimulatedLatency, StorageBackend, TransitionPolicy};
pub use crate::core::{ContextData, Handler, PipelineControl, PipelineResult, SkipCondition, StepDef};
pub use crate::error::{AppError, FlowError, Result};
pub use crate::flows::{CheckoutQuote, CheckoutRequest, CheckoutService};
pub use crate::models::{CartLine, Order, OrderLine, OrderStatus, PaymentMethod, ProfilePatch, User};
pub use crate::persistence::{FileStore, KeyValueStore, MemoryStore, PersistedSlot, PersistenceError};
pub use crate::pipeline::Pipeline;
pub use crate::stores::{
  AddItemOutcome, Cart, CartStore, CartSummary, Landing, OnMerchantConflict, OrderHistoryStore, SessionStore,
};
