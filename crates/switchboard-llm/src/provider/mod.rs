//! Provider contract and the adapters implementing it

mod client;
pub mod local;
pub mod openai;
mod registry;

#[cfg(test)]
pub(crate) mod scripted;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

pub use registry::ProviderRegistry;

use crate::convert;
use crate::error::LlmError;
use crate::protocol::canonical::{CanonicalRequest, CanonicalResponse, CanonicalStreamEvent};
use crate::protocol::provider::{ProviderRequest, ProviderResponse, ProviderStreamChunk};

/// Raw body of a streaming provider response
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, LlmError>> + Send>>;

/// Capabilities advertised by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// Whether image blocks are forwarded as `image_url` parts
    pub images: bool,
}

/// Trait implemented by each upstream adapter
///
/// Transformations have defaults built on the shared OpenAI-style mapping.
/// Adapters override them only where their upstream deviates.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Configured provider name
    fn name(&self) -> &str;

    /// Advertised capabilities
    fn capabilities(&self) -> ProviderCapabilities;

    /// Build the provider request from a routed canonical request
    fn transform_request(&self, request: &CanonicalRequest) -> ProviderRequest {
        convert::to_provider_request(request, self.capabilities().images)
    }

    /// Send a non-streaming request
    async fn create_request(&self, request: &ProviderRequest) -> Result<ProviderResponse, LlmError>;

    /// Open a streaming request and return the raw body
    ///
    /// Connection and status failures surface here, before any body bytes.
    async fn create_stream_request(&self, request: &ProviderRequest) -> Result<ByteStream, LlmError>;

    /// Translate a complete provider response
    fn transform_response(&self, response: ProviderResponse) -> Result<CanonicalResponse, LlmError> {
        convert::to_canonical_response(response)
    }

    /// Translate one parsed stream chunk
    fn transform_stream_chunk(&self, chunk: &ProviderStreamChunk) -> Option<CanonicalStreamEvent> {
        convert::to_canonical_event(chunk)
    }
}
