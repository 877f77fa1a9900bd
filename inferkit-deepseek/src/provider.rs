use crate::metadata_extractor::DeepSeekMetadataExtractor;
use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_provider::shared::Headers;
use inferkit_provider::{LanguageModel, Provider, ProviderError};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Settings for the DeepSeek provider.
#[derive(Debug, Clone, Default)]
pub struct DeepSeekProviderSettings {
    /// Explicit API key; falls back to `DEEPSEEK_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The DeepSeek provider.
pub struct DeepSeekProvider {
    config: OpenAICompatibleConfig,
}

impl DeepSeekProvider {
    /// Create a provider from settings.
    pub fn new(settings: DeepSeekProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "DEEPSEEK_API_KEY", "DeepSeek")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        let config = OpenAICompatibleConfig::new(
            "deepseek.chat",
            settings
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            headers,
        )
        .with_metadata_extractor(Arc::new(DeepSeekMetadataExtractor));

        Ok(Self { config })
    }
}

impl Provider for DeepSeekProvider {
    fn provider_id(&self) -> &str {
        "deepseek"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(ChatLanguageModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create a DeepSeek provider with default settings.
pub fn create_deepseek() -> Result<DeepSeekProvider, ProviderError> {
    DeepSeekProvider::new(DeepSeekProviderSettings::default())
}
