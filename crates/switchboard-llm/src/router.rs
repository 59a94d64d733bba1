//! Axum route handlers for the canonical Messages API

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use switchboard_config::LlmConfig;
use switchboard_core::{HttpError, error_response};

use crate::convert;
use crate::error::{ErrorKind, LlmError};
use crate::headers;
use crate::protocol::canonical::{CanonicalRequest, CanonicalStreamEvent};
use crate::provider::{Provider, ProviderRegistry};
use crate::routing::{ModelRouter, RoutingResult};
use crate::stream;
use crate::validate::validate_request;

/// Shared state for the Messages API handlers
#[derive(Clone)]
pub struct LlmState {
    inner: Arc<LlmStateInner>,
}

struct LlmStateInner {
    router: ModelRouter,
    registry: ProviderRegistry,
}

impl LlmState {
    /// Build state from configuration, constructing every provider
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let registry = ProviderRegistry::from_config(config)?;
        Ok(Self::new(ModelRouter::new(config), registry))
    }

    pub fn new(router: ModelRouter, registry: ProviderRegistry) -> Self {
        Self {
            inner: Arc::new(LlmStateInner { router, registry }),
        }
    }

    pub fn default_provider(&self) -> &str {
        self.inner.router.default_provider()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.inner.registry.names()
    }

    fn resolve(&self, model: &str) -> Result<(RoutingResult, Arc<dyn Provider>), LlmError> {
        let routing = self.inner.router.resolve(model);
        let provider = self.inner.registry.get(&routing.provider_name)?;
        Ok((routing, provider))
    }
}

/// Build the Messages API router
pub fn llm_router(state: LlmState) -> Router {
    Router::new()
        .route("/v1/messages", routing::post(messages))
        .route("/providers", routing::get(list_providers))
        .with_state(state)
}

/// Handle `POST /v1/messages`
async fn messages(State(state): State<LlmState>, body: Result<Bytes, BytesRejection>) -> Response {
    let started = Instant::now();

    let result = match body {
        Ok(body) => handle_messages(&state, &body).await,
        Err(rejection) => Err(LlmError::RequestBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }),
    };

    match result {
        Ok(response) => response,
        Err(error) => {
            let elapsed = started.elapsed();
            match error.kind() {
                ErrorKind::InvalidRequest => {
                    tracing::info!(error = %error, ?elapsed, "rejected request");
                }
                ErrorKind::UpstreamUnavailable | ErrorKind::Internal => {
                    tracing::error!(error = %error, status = %error.status_code(), ?elapsed, "request failed");
                }
            }
            error_response(&error)
        }
    }
}

/// Validate, route and forward one request
///
/// A streaming request opens the upstream stream before any response bytes
/// are written, so connection and status failures still produce a JSON
/// error envelope. The client receives no headers until the provider has
/// answered.
async fn handle_messages(state: &LlmState, body: &[u8]) -> Result<Response, LlmError> {
    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| LlmError::InvalidRequest(format!("request body is not valid JSON: {e}")))?;
    let request = validate_request(payload)?;

    let (routing, provider) = state.resolve(&request.model)?;
    tracing::info!(
        provider = %routing.provider_name,
        model = %routing.model_name,
        stream = request.is_stream(),
        "routing request"
    );

    let routed = CanonicalRequest {
        model: routing.model_name.clone(),
        ..request.clone()
    };
    let provider_request = provider.transform_request(&routed);

    if request.is_stream() {
        let upstream = provider.create_stream_request(&provider_request).await?;
        let message_id = convert::new_message_id();
        let events = stream::canonical_event_stream(upstream, provider, &message_id, &request.model);

        Ok((headers::stream_headers(), sse_response(events)).into_response())
    } else {
        let response = provider.create_request(&provider_request).await?;
        let mut canonical = provider.transform_response(response)?;
        if canonical.model.is_empty() {
            canonical.model = routing.model_name;
        }

        Ok((headers::json_headers(), Json(canonical)).into_response())
    }
}

/// Encode canonical events as `event: message` SSE frames
///
/// No keep-alive comments are interleaved. An error item aborts the
/// connection.
fn sse_response(
    events: impl Stream<Item = Result<CanonicalStreamEvent, LlmError>> + Send + 'static,
) -> Sse<impl Stream<Item = Result<Event, LlmError>> + Send> {
    Sse::new(events.map(|result| {
        result.and_then(|event| {
            Event::default()
                .event("message")
                .json_data(&event)
                .map_err(|e| LlmError::Streaming(e.to_string()))
        })
    }))
}

#[derive(Debug, Serialize)]
struct ProvidersResponse {
    supported_providers: Vec<String>,
    default_provider: String,
}

/// Handle `GET /providers`
async fn list_providers(State(state): State<LlmState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        supported_providers: state.provider_names(),
        default_provider: state.default_provider().to_owned(),
    })
}
