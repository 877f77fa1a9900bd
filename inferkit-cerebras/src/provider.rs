use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_provider::shared::Headers;
use inferkit_provider::{LanguageModel, Provider, ProviderError};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.cerebras.ai/v1";

/// Settings for the Cerebras provider.
#[derive(Debug, Clone, Default)]
pub struct CerebrasProviderSettings {
    /// Explicit API key; falls back to `CEREBRAS_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The Cerebras provider.
pub struct CerebrasProvider {
    config: OpenAICompatibleConfig,
}

impl CerebrasProvider {
    /// Create a provider from settings.
    pub fn new(settings: CerebrasProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "CEREBRAS_API_KEY", "Cerebras")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        Ok(Self {
            config: OpenAICompatibleConfig::new(
                "cerebras.chat",
                settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                headers,
            ),
        })
    }
}

impl Provider for CerebrasProvider {
    fn provider_id(&self) -> &str {
        "cerebras"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(ChatLanguageModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create a Cerebras provider with default settings.
pub fn create_cerebras() -> Result<CerebrasProvider, ProviderError> {
    CerebrasProvider::new(CerebrasProviderSettings::default())
}
