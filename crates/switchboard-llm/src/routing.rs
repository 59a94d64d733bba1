//! Model routing
//!
//! A model identifier of the form `provider/model` selects a provider
//! explicitly. Anything else goes to the default provider unchanged.

use std::collections::HashMap;

use indexmap::IndexMap;
use switchboard_config::LlmConfig;

/// Resolved target for a model request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingResult {
    /// Provider name (key in config)
    pub provider_name: String,
    /// Model identifier to send to the provider
    pub model_name: String,
}

/// Split a model identifier into provider and model
///
/// Splits at the first `/` only, so `a/b/c` routes to provider `a` with
/// model `b/c`. The split may yield empty parts; those are passed through
/// and rejected later by provider lookup.
pub fn route(model: &str, default_provider: &str) -> RoutingResult {
    match model.split_once('/') {
        Some((provider, model)) => RoutingResult {
            provider_name: provider.to_owned(),
            model_name: model.to_owned(),
        },
        None => RoutingResult {
            provider_name: default_provider.to_owned(),
            model_name: model.to_owned(),
        },
    }
}

#[derive(Debug, Clone, Default)]
struct ProviderModels {
    mapping: IndexMap<String, String>,
    default_model: Option<String>,
}

/// Routing table built from configuration
///
/// Adds per-provider model aliases and default models on top of [`route`].
#[derive(Debug, Clone)]
pub struct ModelRouter {
    default_provider: String,
    providers: HashMap<String, ProviderModels>,
}

impl ModelRouter {
    pub fn new(config: &LlmConfig) -> Self {
        let providers = config
            .providers
            .iter()
            .map(|(name, provider)| {
                let models = ProviderModels {
                    mapping: provider.model_mapping.clone(),
                    default_model: provider.default_model.clone(),
                };
                (name.clone(), models)
            })
            .collect();

        Self {
            default_provider: config.default_provider.clone(),
            providers,
        }
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Route a model identifier and apply the target provider's model table
    pub fn resolve(&self, model: &str) -> RoutingResult {
        let mut result = route(model, &self.default_provider);

        let Some(models) = self.providers.get(&result.provider_name) else {
            return result;
        };

        if let Some(mapped) = models.mapping.get(&result.model_name) {
            tracing::debug!(from = %result.model_name, to = %mapped, "applied model mapping");
            result.model_name.clone_from(mapped);
        }

        if result.model_name.is_empty()
            && let Some(default_model) = &models.default_model
        {
            result.model_name.clone_from(default_model);
        }

        result
    }
}
