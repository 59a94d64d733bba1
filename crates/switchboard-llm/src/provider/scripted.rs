//! In-process provider returning canned responses

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;

use super::{ByteStream, Provider, ProviderCapabilities};
use crate::error::LlmError;
use crate::protocol::provider::{ProviderRequest, ProviderResponse};

pub(crate) struct ScriptedProvider {
    name: String,
    response: Option<ProviderResponse>,
    chunks: Vec<Result<Bytes, String>>,
    pub(crate) requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            response: None,
            chunks: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_response(mut self, response: ProviderResponse) -> Self {
        self.response = Some(response);
        self
    }

    pub(crate) fn with_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.chunks = chunks
            .into_iter()
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk.as_ref())))
            .collect();
        self
    }

    pub(crate) fn with_failure(mut self, message: &str) -> Self {
        self.chunks.push(Err(message.to_owned()));
        self
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            images: false,
        }
    }

    async fn create_request(&self, request: &ProviderRequest) -> Result<ProviderResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.response
            .clone()
            .ok_or_else(|| LlmError::UpstreamUnavailable(format!("{}: connection refused", self.name)))
    }

    async fn create_stream_request(&self, request: &ProviderRequest) -> Result<ByteStream, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let chunks: Vec<Result<Bytes, LlmError>> = self
            .chunks
            .iter()
            .map(|chunk| chunk.clone().map_err(LlmError::Streaming))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}
