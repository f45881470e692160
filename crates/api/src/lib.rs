//! Brokerlink API Library
//!
//! Redirect service that normalizes proxied, multiply-encoded target URLs
//! and sends the browser to an institutional access broker.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError, LogFormat, PrefixStatus};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
