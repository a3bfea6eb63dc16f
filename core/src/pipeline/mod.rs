// campus-eats/src/pipeline/mod.rs

//! The `Pipeline<TData, Err>` struct, its construction and execution.

pub mod definition;
pub mod execution;

pub use definition::Pipeline;
