use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::embedding::OpenAICompatibleEmbeddingModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_provider::shared::Headers;
use inferkit_provider::{EmbeddingModel, LanguageModel, Provider, ProviderError};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
const EMBEDDING_BATCH: usize = 32;

/// Settings for the Mistral provider.
#[derive(Debug, Clone, Default)]
pub struct MistralProviderSettings {
    /// Explicit API key; falls back to `MISTRAL_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The Mistral provider.
pub struct MistralProvider {
    config: OpenAICompatibleConfig,
}

impl MistralProvider {
    /// Create a provider from settings.
    pub fn new(settings: MistralProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "MISTRAL_API_KEY", "Mistral")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        Ok(Self {
            config: OpenAICompatibleConfig::new(
                "mistral.chat",
                settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                headers,
            ),
        })
    }
}

impl Provider for MistralProvider {
    fn provider_id(&self) -> &str {
        "mistral"
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

/// Create a Mistral provider with default settings.
pub fn create_mistral() -> Result<MistralProvider, ProviderError> {
    MistralProvider::new(MistralProviderSettings::default())
}
