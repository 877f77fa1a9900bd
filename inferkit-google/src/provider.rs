use crate::embedding::GoogleEmbeddingModel;
use crate::language_model::{GoogleAuth, GoogleConfig, GoogleLanguageModel};
use inferkit_provider::shared::Headers;
use inferkit_provider::{EmbeddingModel, LanguageModel, Provider, ProviderError};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings for the Generative Language API provider.
#[derive(Debug, Clone, Default)]
pub struct GoogleProviderSettings {
    /// Explicit API key; falls back to `GOOGLE_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
    /// Extra headers sent with every request.
    pub headers: Option<Headers>,
}

/// The Google Generative Language provider.
pub struct GoogleProvider {
    config: GoogleConfig,
}

impl GoogleProvider {
    /// Create a provider from settings. Authentication uses the
    /// `x-goog-api-key` header.
    pub fn new(settings: GoogleProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "GOOGLE_API_KEY", "Google")?;
        let base_url = settings
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            config: GoogleConfig {
                provider: "google.generative-ai".to_string(),
                url: Arc::new(move |model_id, op| format!("{base_url}/models/{model_id}:{op}")),
                auth: GoogleAuth::ApiKey(api_key),
                extra_headers: settings.headers.unwrap_or_default(),
                client: reqwest::Client::new(),
            },
        })
    }
}

impl Provider for GoogleProvider {
    fn provider_id(&self) -> &str {
        "google"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(GoogleLanguageModel::new(
            model_id,
            self.config.clone(),
        )))
    }

    fn text_embedding_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn EmbeddingModel<String>>, ProviderError> {
        Ok(Arc::new(GoogleEmbeddingModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create a Google provider with default settings.
pub fn create_google() -> Result<GoogleProvider, ProviderError> {
    GoogleProvider::new(GoogleProviderSettings::default())
}
