use std::sync::Arc;

use indexmap::IndexMap;
use switchboard_config::{LlmConfig, LlmProviderType};

use super::Provider;
use super::local::LocalProvider;
use super::openai::OpenAiProvider;
use crate::error::LlmError;

/// Configured providers, keyed by name in declaration order
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: IndexMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Instantiate one adapter per configured provider
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut registry = Self::default();

        for (name, provider_config) in &config.providers {
            let provider: Arc<dyn Provider> = match provider_config.provider_type {
                LlmProviderType::Openai => Arc::new(OpenAiProvider::new(name, provider_config)?),
                LlmProviderType::Local => Arc::new(LocalProvider::new(name, provider_config)?),
            };

            tracing::debug!(provider = %name, kind = ?provider_config.provider_type, "registered provider");
            registry.register(provider);
        }

        Ok(registry)
    }

    /// Add a provider under its own name, replacing any previous entry
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_owned(), provider);
    }

    /// Look up a provider by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Provider>, LlmError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| LlmError::ProviderNotFound {
                provider: name.to_owned(),
                supported: self.names(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }
}
