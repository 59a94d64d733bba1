use axum::response::Response;
use http::{Method, StatusCode, Uri};
use switchboard_core::{HttpError, error_response};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Not found: {method} {path}")]
struct NotFound {
    method: Method,
    path: String,
}

impl HttpError for NotFound {
    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    fn error_type(&self) -> &str {
        "not_found_error"
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

/// Render unknown routes as a canonical error envelope
pub async fn not_found(method: Method, uri: Uri) -> Response {
    tracing::debug!(%method, path = uri.path(), "no route matched");

    error_response(&NotFound {
        method,
        path: uri.path().to_owned(),
    })
}
