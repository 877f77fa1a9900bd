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

const DEFAULT_BASE_URL: &str = "https://api.deepinfra.com/v1/openai";
const EMBEDDING_BATCH: usize = 96;

/// Settings for the DeepInfra provider.
#[derive(Debug, Clone, Default)]
pub struct DeepInfraProviderSettings {
    /// Explicit API key; falls back to `DEEPINFRA_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The DeepInfra provider.
pub struct DeepInfraProvider {
    config: OpenAICompatibleConfig,
}

impl DeepInfraProvider {
    /// Create a provider from settings.
    pub fn new(settings: DeepInfraProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "DEEPINFRA_API_KEY", "DeepInfra")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        Ok(Self {
            config: OpenAICompatibleConfig::new(
                "deepinfra.chat",
                settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                headers,
            ),
        })
    }
}

impl Provider for DeepInfraProvider {
    fn provider_id(&self) -> &str {
        "deepinfra"
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
        Ok(Arc::new(
            OpenAICompatibleEmbeddingModel::new(model_id, self.config.clone())
                .with_max_embeddings_per_call(EMBEDDING_BATCH),
        ))
    }

    fn image_model(&self, model_id: &str) -> Result<Arc<dyn ImageModel>, ProviderError> {
        Ok(Arc::new(OpenAICompatibleImageModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create a DeepInfra provider with default settings.
pub fn create_deepinfra() -> Result<DeepInfraProvider, ProviderError> {
    DeepInfraProvider::new(DeepInfraProviderSettings::default())
}
