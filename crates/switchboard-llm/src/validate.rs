//! Request validation

use serde_json::Value;

use crate::error::LlmError;
use crate::protocol::canonical::CanonicalRequest;

/// Validate a raw request body and deserialize it
///
/// The required fields are checked on the raw JSON first so clients get a
/// message naming the field instead of a serde path.
pub fn validate_request(payload: Value) -> Result<CanonicalRequest, LlmError> {
    let Some(object) = payload.as_object() else {
        return Err(invalid("request body must be a JSON object"));
    };

    if !object
        .get("model")
        .and_then(Value::as_str)
        .is_some_and(|model| !model.is_empty())
    {
        return Err(invalid("model: field is required and must be a non-empty string"));
    }

    if !object
        .get("messages")
        .and_then(Value::as_array)
        .is_some_and(|messages| !messages.is_empty())
    {
        return Err(invalid("messages: field is required and must be a non-empty array"));
    }

    if !object
        .get("max_tokens")
        .and_then(Value::as_u64)
        .is_some_and(|max_tokens| max_tokens > 0)
    {
        return Err(invalid("max_tokens: field is required and must be a positive integer"));
    }

    serde_json::from_value(payload).map_err(|e| invalid(&format!("invalid request: {e}")))
}

fn invalid(message: &str) -> LlmError {
    LlmError::InvalidRequest(message.to_owned())
}
