//! Static client configuration.
//!
//! Values come from `STOCKTRACK_*` environment variables (or a JSON document)
//! and fall back to development defaults.

use anyhow::Context;
use serde::Deserialize;

use stocktrack_ai::ExtractionPrompt;
use stocktrack_inventory::{CategoryRegistry, DEFAULT_CATEGORIES, DEFAULT_MIN_STOCK};
use stocktrack_observability::{LogFormat, LogSettings};

pub const ENV_AI_API_KEY: &str = "STOCKTRACK_AI_API_KEY";
pub const ENV_AI_MODEL: &str = "STOCKTRACK_AI_MODEL";
pub const ENV_AI_ENDPOINT: &str = "STOCKTRACK_AI_ENDPOINT";
pub const ENV_AI_DEFAULT_MIN_STOCK: &str = "STOCKTRACK_AI_DEFAULT_MIN_STOCK";
pub const ENV_CATEGORIES: &str = "STOCKTRACK_CATEGORIES";
pub const ENV_COLLECTION: &str = "STOCKTRACK_COLLECTION";
pub const ENV_LOG_FORMAT: &str = "STOCKTRACK_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub default_min_stock: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            default_min_stock: DEFAULT_MIN_STOCK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: "inventory".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub ai: AiConfig,
    pub store: StoreConfig,
    /// Registry seed; also the closed category set given to the extractor.
    pub categories: Vec<String>,
    /// `json` (default) or `pretty`.
    pub log_format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            store: StoreConfig::default(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            log_format: "json".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (env-like). Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get(ENV_AI_API_KEY) {
            config.ai.api_key = Some(key);
        }
        if let Some(model) = get(ENV_AI_MODEL) {
            config.ai.model = model;
        }
        if let Some(endpoint) = get(ENV_AI_ENDPOINT) {
            config.ai.endpoint = endpoint;
        }
        if let Some(raw) = get(ENV_AI_DEFAULT_MIN_STOCK) {
            config.ai.default_min_stock = raw
                .parse()
                .with_context(|| format!("{ENV_AI_DEFAULT_MIN_STOCK} must be a non-negative integer, got {raw:?}"))?;
        }
        if let Some(raw) = get(ENV_CATEGORIES) {
            config.categories = raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(collection) = get(ENV_COLLECTION) {
            config.store.collection = collection;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            config.log_format = format;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(raw).context("failed to parse client config JSON")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.categories.is_empty() {
            anyhow::bail!("at least one category is required");
        }
        if self.store.collection.trim().is_empty() {
            anyhow::bail!("store collection name cannot be empty");
        }
        Ok(())
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            format: LogFormat::parse(&self.log_format),
            ..LogSettings::default()
        }
    }

    pub fn category_registry(&self) -> CategoryRegistry {
        CategoryRegistry::with_labels(self.categories.iter().cloned())
    }

    pub fn extraction_prompt(&self) -> ExtractionPrompt {
        ExtractionPrompt::new(self.categories.iter().cloned())
            .with_default_min_stock(self.ai.default_min_stock)
    }

    /// Gemini-backed extractor. Requires an API key.
    #[cfg(feature = "http")]
    pub fn gemini_extractor(
        &self,
    ) -> anyhow::Result<stocktrack_ai::LlmExtractor<stocktrack_ai::GeminiBackend>> {
        let api_key = self
            .ai
            .api_key
            .clone()
            .with_context(|| format!("{ENV_AI_API_KEY} is not set"))?;

        let backend = stocktrack_ai::GeminiBackend::new(api_key)
            .with_endpoint(self.ai.endpoint.clone())
            .with_model(self.ai.model.clone());

        Ok(stocktrack_ai::LlmExtractor::new(backend).with_prompt(self.extraction_prompt()))
    }
}
