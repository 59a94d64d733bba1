//! Local inference server provider (Ollama, llama.cpp, LM Studio)

use async_trait::async_trait;
use switchboard_config::LlmProviderConfig;
use url::Url;

use super::client::ChatCompletionsClient;
use super::{ByteStream, Provider, ProviderCapabilities};
use crate::error::LlmError;
use crate::protocol::provider::{ProviderRequest, ProviderResponse};

/// Ollama's OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

pub struct LocalProvider {
    name: String,
    client: ChatCompletionsClient,
    images: bool,
}

impl LocalProvider {
    pub fn new(name: &str, config: &LlmProviderConfig) -> Result<Self, LlmError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| LlmError::Internal(anyhow::anyhow!("invalid default base URL: {e}")))?,
        };

        Ok(Self {
            name: name.to_owned(),
            client: ChatCompletionsClient::new(name, base_url, config)?,
            // Most local models are text-only
            images: config.images.unwrap_or(false),
        })
    }
}

#[async_trait]
impl Provider for LocalProvider {
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
        request.stream = Some(false);
        self.client.complete(&request).await
    }

    async fn create_stream_request(&self, request: &ProviderRequest) -> Result<ByteStream, LlmError> {
        let mut request = request.clone();
        request.stream = Some(true);
        self.client.stream(&request).await
    }
}
