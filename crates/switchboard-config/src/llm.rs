use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Provider routing configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider used when the requested model carries no `provider/` prefix
    pub default_provider: String,
    /// Provider configurations keyed by name, in declaration order
    #[serde(default)]
    pub providers: IndexMap<String, LlmProviderConfig>,
}

/// Configuration for a single upstream provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmProviderConfig {
    /// Adapter flavour
    #[serde(rename = "type")]
    pub provider_type: LlmProviderType,
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override (the adapter appends `/chat/completions`)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model used when the routed model name is empty (e.g. `ollama/`)
    #[serde(default)]
    pub default_model: Option<String>,
    /// Static headers added to every upstream request
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Override whether image blocks are forwarded to this provider
    #[serde(default)]
    pub images: Option<bool>,
    /// Client model name -> provider model name
    #[serde(default)]
    pub model_mapping: IndexMap<String, String>,
}

impl LlmProviderConfig {
    /// Minimal configuration for a provider of the given type
    pub fn new(provider_type: LlmProviderType) -> Self {
        Self {
            provider_type,
            api_key: None,
            base_url: None,
            default_model: None,
            headers: IndexMap::new(),
            images: None,
            model_mapping: IndexMap::new(),
        }
    }
}

/// Supported upstream adapter flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderType {
    /// Hosted OpenAI-compatible chat completion API
    Openai,
    /// Local inference server exposing an OpenAI-compatible API
    /// (Ollama, llama.cpp server, LM Studio)
    Local,
}
