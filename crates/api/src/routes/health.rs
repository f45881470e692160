//! Health check endpoint

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{config::Config, state::AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub environment: String,
    pub config_status: ConfigStatus,
}

/// Snapshot of active configuration. Prefix URLs are deliberately absent.
#[derive(Debug, Serialize)]
pub struct ConfigStatus {
    pub openathens_prefixes_configured: bool,
    pub valid_hosts: Vec<String>,
    pub valid_referrers: Vec<String>,
    pub proxy_domain: String,
}

impl From<&Config> for ConfigStatus {
    fn from(config: &Config) -> Self {
        Self {
            openathens_prefixes_configured: !config.broker_prefixes.is_empty(),
            valid_hosts: config.valid_hosts.iter().cloned().collect(),
            valid_referrers: config.valid_referrers.iter().cloned().collect(),
            proxy_domain: config.proxy_domain.clone(),
        }
    }
}

/// Liveness plus configuration snapshot; always 200
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: OffsetDateTime::now_utc(),
            environment: state.config.environment.clone(),
            config_status: ConfigStatus::from(state.config.as_ref()),
        }),
    )
}
