//! Error types for the redirect pipeline

use thiserror::Error;

use crate::types::RejectReason;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The query string carries no `url=` parameter
    #[error("No URL parameter found in request")]
    MissingParameter,

    /// Decoding or encoding could not produce a usable value
    #[error("{0}")]
    MalformedInput(String),

    /// Target host or referrer is not allow-listed
    #[error("Verification failed: {0}")]
    VerificationFailure(RejectReason),
}

/// Result type alias for pipeline stages
pub type PipelineResult<T> = Result<T, PipelineError>;
