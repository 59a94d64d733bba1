use std::path::Path;

use http::{HeaderName, HeaderValue};

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`Config::from_toml`] fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// Expands `{{ env.VAR }}` placeholders, deserializes, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured, the default provider
    /// is unknown, or a static header is not a valid HTTP header
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_providers()?;
        self.validate_headers()?;
        Ok(())
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        if self.llm.providers.is_empty() {
            anyhow::bail!("at least one provider must be configured under [llm.providers]");
        }

        if !self.llm.providers.contains_key(&self.llm.default_provider) {
            let known: Vec<&str> = self.llm.providers.keys().map(String::as_str).collect();
            anyhow::bail!(
                "default_provider '{}' is not a configured provider (configured: {})",
                self.llm.default_provider,
                known.join(", ")
            );
        }

        Ok(())
    }

    fn validate_headers(&self) -> anyhow::Result<()> {
        for (name, provider) in &self.llm.providers {
            for (header, value) in &provider.headers {
                HeaderName::try_from(header.as_str())
                    .map_err(|e| anyhow::anyhow!("invalid header name '{header}' for provider '{name}': {e}"))?;
                HeaderValue::try_from(value.as_str())
                    .map_err(|e| anyhow::anyhow!("invalid value for header '{header}' on provider '{name}': {e}"))?;
            }
        }

        Ok(())
    }
}
