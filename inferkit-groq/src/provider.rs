use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_openai_compatible::speech::OpenAICompatibleSpeechModel;
use inferkit_openai_compatible::transcription::OpenAICompatibleTranscriptionModel;
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    LanguageModel, Provider, ProviderError, SpeechModel, TranscriptionModel,
};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Settings for the Groq provider.
#[derive(Debug, Clone, Default)]
pub struct GroqProviderSettings {
    /// Explicit API key; falls back to `GROQ_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The Groq provider.
pub struct GroqProvider {
    config: OpenAICompatibleConfig,
}

impl GroqProvider {
    /// Create a provider from settings.
    pub fn new(settings: GroqProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "GROQ_API_KEY", "Groq")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        Ok(Self {
            config: OpenAICompatibleConfig::new(
                "groq.chat",
                settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                headers,
            ),
        })
    }
}

impl Provider for GroqProvider {
    fn provider_id(&self) -> &str {
        "groq"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(ChatLanguageModel::new(
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

/// Create a Groq provider with default settings.
pub fn create_groq() -> Result<GroqProvider, ProviderError> {
    GroqProvider::new(GroqProviderSettings::default())
}
