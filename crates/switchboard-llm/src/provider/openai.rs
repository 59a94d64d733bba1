//! Hosted OpenAI-compatible provider

use async_trait::async_trait;
use switchboard_config::LlmProviderConfig;
use url::Url;

use super::client::ChatCompletionsClient;
use super::{ByteStream, Provider, ProviderCapabilities};
use crate::error::LlmError;
use crate::protocol::provider::{ProviderRequest, ProviderResponse, StreamOptions};

/// Default `OpenAI` API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Whether the provider is the canonical OpenAI API (vs a compatible third-party)
fn is_canonical_openai(base_url: &Url) -> bool {
    base_url.host_str().is_some_and(|h| h == "api.openai.com")
}

pub struct OpenAiProvider {
    name: String,
    client: ChatCompletionsClient,
    images: bool,
}

impl OpenAiProvider {
    pub fn new(name: &str, config: &LlmProviderConfig) -> Result<Self, LlmError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| LlmError::Internal(anyhow::anyhow!("invalid default base URL: {e}")))?,
        };

        Ok(Self {
            name: name.to_owned(),
            client: ChatCompletionsClient::new(name, base_url, config)?,
            images: config.images.unwrap_or(true),
        })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            images: self.images,
        }
    }

    async fn create_request(&self, request: &ProviderRequest) -> Result<ProviderResponse, LlmError> {
        let mut request = request.clone();
        request.stream = None;
        self.client.complete(&request).await
    }

    async fn create_stream_request(&self, request: &ProviderRequest) -> Result<ByteStream, LlmError> {
        let mut request = request.clone();
        request.stream = Some(true);

        // Compatible APIs often reject the unknown parameter
        request.stream_options =
            is_canonical_openai(self.client.base_url()).then_some(StreamOptions { include_usage: true });

        self.client.stream(&request).await
    }
}
