use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    default_provider: Arc<str>,
}

impl HealthState {
    pub fn new(default_provider: &str) -> Self {
        Self {
            default_provider: Arc::from(default_provider),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    provider: String,
}

/// Health check handler
pub async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: jiff::Timestamp::now().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        provider: state.default_provider.to_string(),
    })
}
