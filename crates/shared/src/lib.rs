//! Brokerlink Shared Types and Errors
//!
//! Request-scoped types and the pipeline error taxonomy used by the
//! redirect service.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
