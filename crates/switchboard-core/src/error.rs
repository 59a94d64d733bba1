use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The server layer
/// renders these through [`error_response`], keeping domain errors
/// decoupled from the transport.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// Render an error as the uniform JSON envelope
///
/// `{"type": "error", "error": {"type": ..., "message": ...}}`
pub fn error_response<E: HttpError + ?Sized>(error: &E) -> Response {
    let body = serde_json::json!({
        "type": "error",
        "error": {
            "type": error.error_type(),
            "message": error.client_message(),
        }
    });

    (error.status_code(), Json(body)).into_response()
}
