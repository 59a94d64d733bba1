//! Chat completions client shared by the adapters

use std::time::Duration;

use anyhow::anyhow;
use futures_util::StreamExt;
use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use switchboard_config::LlmProviderConfig;
use url::Url;

use super::ByteStream;
use crate::error::LlmError;
use crate::protocol::provider::{ProviderRequest, ProviderResponse};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) struct ChatCompletionsClient {
    provider: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    headers: HeaderMap,
}

impl ChatCompletionsClient {
    pub(super) fn new(provider: &str, base_url: Url, config: &LlmProviderConfig) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| LlmError::Internal(anyhow!("invalid header name '{name}': {e}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| LlmError::Internal(anyhow!("invalid value for header '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Internal(anyhow!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            provider: provider.to_owned(),
            client,
            base_url,
            api_key: config.api_key.clone(),
            headers,
        })
    }

    pub(super) const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    async fn send(&self, request: &ProviderRequest) -> Result<Response, LlmError> {
        let mut builder = self
            .client
            .post(self.completions_url())
            .headers(self.headers.clone())
            .json(request);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(provider = %self.provider, error = %e, "upstream request failed");
            if e.is_connect() || e.is_timeout() {
                LlmError::UpstreamUnavailable(format!("{}: {e}", self.provider))
            } else {
                LlmError::Internal(anyhow!("upstream request to {} failed: {e}", self.provider))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = %self.provider, %status, "upstream returned error");
            return Err(LlmError::UpstreamStatus { status, body });
        }

        Ok(response)
    }

    pub(super) async fn complete(&self, request: &ProviderRequest) -> Result<ProviderResponse, LlmError> {
        let response = self.send(request).await?;

        response
            .json()
            .await
            .map_err(|e| LlmError::Internal(anyhow!("failed to parse response from {}: {e}", self.provider)))
    }

    pub(super) async fn stream(&self, request: &ProviderRequest) -> Result<ByteStream, LlmError> {
        let response = self.send(request).await?;
        let provider = self.provider.clone();

        let body = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|e| LlmError::Streaming(format!("{provider}: {e}")))
        });

        Ok(Box::pin(body))
    }
}
