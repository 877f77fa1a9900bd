use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::embedding::OpenAICompatibleEmbeddingModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_provider::shared::Headers;
use inferkit_provider::{EmbeddingModel, LanguageModel, Provider, ProviderError};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai/compatibility/v1";
const EMBEDDING_BATCH: usize = 96;

/// Settings for the Cohere provider.
#[derive(Debug, Clone, Default)]
pub struct CohereProviderSettings {
    /// Explicit API key; falls back to `COHERE_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The Cohere provider.
pub struct CohereProvider {
    config: OpenAICompatibleConfig,
}

impl CohereProvider {
    /// Create a provider from settings.
    pub fn new(settings: CohereProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "COHERE_API_KEY", "Cohere")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        Ok(Self {
            config: OpenAICompatibleConfig::new(
                "cohere.chat",
                settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                headers,
            ),
        })
    }
}

impl Provider for CohereProvider {
    fn provider_id(&self) -> &str {
        "cohere"
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
}

/// Create a Cohere provider with default settings.
pub fn create_cohere() -> Result<CohereProvider, ProviderError> {
    CohereProvider::new(CohereProviderSettings::default())
}
