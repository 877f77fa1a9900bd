use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::embedding::OpenAICompatibleEmbeddingModel;
use inferkit_openai_compatible::image::OpenAICompatibleImageModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    EmbeddingModel, ImageModel, LanguageModel, Provider, ProviderError,
};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";

/// Settings for the TogetherAI provider.
#[derive(Debug, Clone, Default)]
pub struct TogetherAIProviderSettings {
    /// Explicit API key; falls back to `TOGETHER_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The TogetherAI provider.
pub struct TogetherAIProvider {
    config: OpenAICompatibleConfig,
}

impl TogetherAIProvider {
    /// Create a provider from settings.
    pub fn new(settings: TogetherAIProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "TOGETHER_API_KEY", "TogetherAI")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        Ok(Self {
            config: OpenAICompatibleConfig::new(
                "togetherai.chat",
                settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                headers,
            ),
        })
    }
}

impl Provider for TogetherAIProvider {
    fn provider_id(&self) -> &str {
        "togetherai"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(ChatLanguageModel::new(
            model_id,
            self.config.clone(),
        )))
    }

    fn text_embedding_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn EmbeddingModel<String>>, ProviderError> {
        Ok(Arc::new(OpenAICompatibleEmbeddingModel::new(
            model_id,
            self.config.clone(),
        )))
    }

    fn image_model(&self, model_id: &str) -> Result<Arc<dyn ImageModel>, ProviderError> {
        Ok(Arc::new(OpenAICompatibleImageModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create a TogetherAI provider with default settings.
pub fn create_togetherai() -> Result<TogetherAIProvider, ProviderError> {
    TogetherAIProvider::new(TogetherAIProviderSettings::default())
}
