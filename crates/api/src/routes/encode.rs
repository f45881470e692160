//! Broker redirect endpoint

use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use brokerlink_shared::{IncomingRequest, PipelineError};

use crate::{
    error::{ApiError, ApiResult},
    pipeline,
    state::AppState,
};

/// `GET /encode?url=...`: answer with a 302 to the broker for the target
pub async fn encode(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    // Non-UTF-8 bytes are replaced rather than dropping the whole header
    let referrer = headers
        .get(header::REFERER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    tracing::debug!(
        original_url = %uri,
        referrer = referrer.as_deref(),
        "Received encoding request"
    );

    let request = IncomingRequest::new(uri.to_string(), referrer);
    let redirect = pipeline::process(&request, &state.config).map_err(|e| {
        if !matches!(e, PipelineError::VerificationFailure(_)) {
            tracing::error!(
                error_type = ?e,
                error_message = %e,
                "URL extraction failed"
            );
        }
        ApiError::from(e)
    })?;

    let location = HeaderValue::from_str(&redirect.location).map_err(|e| {
        tracing::error!(
            error_type = "InvalidHeaderValue",
            error_message = %e,
            final_url = %redirect.location,
            "URL encoding error"
        );
        ApiError::BadRequest(e.to_string())
    })?;
    let status = StatusCode::from_u16(redirect.status).map_err(|_| ApiError::Internal)?;

    Ok((status, [(header::LOCATION, location)]).into_response())
}
