use http::StatusCode;
use switchboard_core::HttpError;
use thiserror::Error;

/// Coarse classification of a failure, used for logging and the envelope type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unsupported client input
    InvalidRequest,
    /// The provider could not be reached
    UpstreamUnavailable,
    /// Anything else
    Internal,
}

/// Errors raised while serving a translated request
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client sent a malformed or invalid request
    #[error("{0}")]
    InvalidRequest(String),

    /// The request body could not be read, for example because it exceeds the size limit
    #[error("{message}")]
    RequestBody { status: StatusCode, message: String },

    /// The routed provider name is not configured
    #[error("Unsupported provider: {provider}. Supported providers: {}", .supported.join(", "))]
    ProviderNotFound { provider: String, supported: Vec<String> },

    /// Connection to the provider failed
    #[error("service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Provider answered with a non-success status
    #[error("provider returned {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    /// Provider stream failed after it was opened
    #[error("streaming error: {0}")]
    Streaming(String),

    /// Unexpected internal error, including unparseable provider responses
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LlmError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) | Self::RequestBody { .. } | Self::ProviderNotFound { .. } => {
                ErrorKind::InvalidRequest
            }
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::UpstreamStatus { .. } | Self::Streaming(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::ProviderNotFound { .. } => StatusCode::BAD_REQUEST,
            Self::RequestBody { status, .. } => *status,
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamStatus { status, .. } => *status,
            Self::Streaming(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) | Self::ProviderNotFound { .. } => "invalid_request_error",
            Self::RequestBody { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => "request_too_large",
            Self::RequestBody { .. } => "invalid_request_error",
            Self::UpstreamStatus { status, .. } => match status.as_u16() {
                400 => "invalid_request_error",
                401 => "authentication_error",
                403 => "permission_error",
                404 => "not_found_error",
                429 => "rate_limit_error",
                _ => "api_error",
            },
            Self::UpstreamUnavailable(_) | Self::Streaming(_) | Self::Internal(_) => "api_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        }
    }
}
