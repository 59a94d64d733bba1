//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use indexmap::IndexMap;
use secrecy::SecretString;
use switchboard_config::{Config, LlmConfig, LlmProviderConfig, LlmProviderType, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder whose default provider is `mock`
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                llm: LlmConfig {
                    default_provider: "mock".to_owned(),
                    providers: IndexMap::new(),
                },
                ..Config::default()
            },
        }
    }

    /// Add an OpenAI-compatible provider pointed at a mock backend
    pub fn with_openai_provider(self, name: &str, base_url: &str) -> Self {
        self.with_provider(name, LlmProviderType::Openai, base_url)
    }

    /// Add a local inference provider pointed at a mock backend
    pub fn with_local_provider(self, name: &str, base_url: &str) -> Self {
        self.with_provider(name, LlmProviderType::Local, base_url)
    }

    fn with_provider(mut self, name: &str, provider_type: LlmProviderType, base_url: &str) -> Self {
        let mut provider = LlmProviderConfig::new(provider_type);
        provider.api_key = Some(SecretString::from("test-key"));
        provider.base_url = Some(base_url.parse().expect("valid URL"));

        self.config.llm.providers.insert(name.to_owned(), provider);
        self
    }

    /// Map a client model name to a provider model name
    pub fn with_model_mapping(mut self, provider: &str, from: &str, to: &str) -> Self {
        self.config
            .llm
            .providers
            .get_mut(provider)
            .expect("provider added before mapping")
            .model_mapping
            .insert(from.to_owned(), to.to_owned());
        self
    }

    /// Set the model used when a routed model name is empty
    pub fn with_default_model(mut self, provider: &str, model: &str) -> Self {
        self.config
            .llm
            .providers
            .get_mut(provider)
            .expect("provider added before default model")
            .default_model = Some(model.to_owned());
        self
    }

    pub fn with_default_provider(mut self, name: &str) -> Self {
        name.clone_into(&mut self.config.llm.default_provider);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().expect("valid test configuration");
        self.config
    }
}
