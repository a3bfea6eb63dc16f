// campus-eats/src/error.rs

use crate::models::OrderStatus;
use crate::persistence::PersistenceError;
use thiserror::Error;

/// Failures raised by the workflow engine itself, as opposed to its handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for non-optional step '{step_name}' in pipeline '{pipeline}'")]
  HandlerMissing { pipeline: &'static str, step_name: String },
}

/// Errors a caller of the stores can act on.
///
/// Storage failures are normally swallowed and logged at the store boundary;
/// `Persistence` only escapes from the explicit bootstrap paths.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Your cart is empty")]
  EmptyCart,

  #[error("Order {order_id} cannot move from {from} to {to}")]
  InvalidTransition {
    order_id: String,
    from: OrderStatus,
    to: OrderStatus,
  },

  #[error("Persistence Error: {0}")]
  Persistence(#[from] PersistenceError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Error: {0}")]
  Internal(String),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
