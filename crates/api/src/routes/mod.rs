//! HTTP routes

pub mod encode;
pub mod health;

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{error::ApiError, state::AppState};

/// Create all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/encode", get(encode::encode))
        .route("/health", get(health::health))
        // Anything that escapes a handler becomes a generic 500
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    tracing::error!(
        error_type = "panic",
        error_message = %message,
        "Unexpected error"
    );
    ApiError::Internal.into_response()
}
