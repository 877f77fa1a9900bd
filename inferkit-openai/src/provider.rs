use crate::reasoning::apply_reasoning_model_rules;
use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::embedding::OpenAICompatibleEmbeddingModel;
use inferkit_openai_compatible::image::OpenAICompatibleImageModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_openai_compatible::speech::OpenAICompatibleSpeechModel;
use inferkit_openai_compatible::transcription::OpenAICompatibleTranscriptionModel;
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    EmbeddingModel, ImageModel, LanguageModel, Provider, ProviderError, SpeechModel,
    TranscriptionModel,
};
use inferkit_provider_utils::api_key::{load_api_key, load_optional_setting};
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Settings for the OpenAI provider.
#[derive(Debug, Clone, Default)]
pub struct OpenAIProviderSettings {
    /// Explicit API key; falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
    /// Organization id, sent as `OpenAI-Organization`.
    pub organization: Option<String>,
    /// Extra headers sent with every request.
    pub headers: Option<Headers>,
}

/// The OpenAI provider.
pub struct OpenAIProvider {
    config: OpenAICompatibleConfig,
}

impl OpenAIProvider {
    /// Create a provider from settings.
    pub fn new(settings: OpenAIProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "OPENAI_API_KEY", "OpenAI")?;
        let organization =
            load_optional_setting(settings.organization.as_deref(), "OPENAI_ORGANIZATION");
        let extra_headers = settings.headers.unwrap_or_default();

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            if let Some(organization) = &organization {
                headers.insert("openai-organization".to_string(), organization.clone());
            }
            headers.extend(extra_headers.clone());
            headers
        });

        let config = OpenAICompatibleConfig::new(
            "openai.chat",
            settings
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            headers,
        )
        .with_structured_outputs(true)
        .with_transform_request_body(Arc::new(apply_reasoning_model_rules));

        Ok(Self { config })
    }
}

impl Provider for OpenAIProvider {
    fn provider_id(&self) -> &str {
        "openai"
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

    fn speech_model(&self, model_id: &str) -> Result<Arc<dyn SpeechModel>, ProviderError> {
        Ok(Arc::new(OpenAICompatibleSpeechModel::new(
            model_id,
            self.config.clone(),
        )))
    }

    fn transcription_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn TranscriptionModel>, ProviderError> {
        Ok(Arc::new(OpenAICompatibleTranscriptionModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create an OpenAI provider with default settings.
pub fn create_openai() -> Result<OpenAIProvider, ProviderError> {
    OpenAIProvider::new(OpenAIProviderSettings::default())
}
