use crate::chat::ChatLanguageModel;
use crate::embedding::OpenAICompatibleEmbeddingModel;
use crate::image::OpenAICompatibleImageModel;
use crate::settings::OpenAICompatibleConfig;
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    EmbeddingModel, ImageModel, LanguageModel, Provider, ProviderError,
};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

/// Settings for a generic OpenAI-compatible provider.
pub struct OpenAICompatibleProviderSettings {
    /// Provider id used in errors, metadata and the registry.
    pub provider_id: String,
    /// Base URL of the API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Explicit API key; falls back to `api_key_env`.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Extra headers sent with every request.
    pub headers: Option<Headers>,
    /// Whether the service enforces JSON schemas server-side.
    pub supports_structured_outputs: bool,
}

/// A provider for any service speaking the chat-completions protocol.
pub struct OpenAICompatibleProvider {
    provider_id: String,
    config: OpenAICompatibleConfig,
}

impl OpenAICompatibleProvider {
    /// Create a provider from settings, resolving the API key eagerly so a
    /// missing credential fails at construction rather than on first call.
    pub fn new(settings: OpenAICompatibleProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(
            settings.api_key.as_deref(),
            &settings.api_key_env,
            &settings.provider_id,
        )?;
        let extra_headers = settings.headers.clone().unwrap_or_default();

        let headers_fn: Arc<dyn Fn() -> Headers + Send + Sync> = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers.extend(extra_headers.clone());
            headers
        });

        let config = OpenAICompatibleConfig::new(
            settings.provider_id.clone(),
            settings.base_url,
            headers_fn,
        )
        .with_structured_outputs(settings.supports_structured_outputs);

        Ok(Self {
            provider_id: settings.provider_id,
            config,
        })
    }

    /// The shared configuration, for provider crates layering on quirks.
    pub fn config(&self) -> &OpenAICompatibleConfig {
        &self.config
    }
}

impl Provider for OpenAICompatibleProvider {
    fn provider_id(&self) -> &str {
        &self.provider_id
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
