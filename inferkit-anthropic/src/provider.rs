use crate::language_model::{AnthropicConfig, AnthropicMessagesLanguageModel};
use inferkit_provider::shared::Headers;
use inferkit_provider::{LanguageModel, Provider, ProviderError};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Settings for the Anthropic provider.
#[derive(Debug, Clone, Default)]
pub struct AnthropicProviderSettings {
    /// Explicit API key; falls back to `ANTHROPIC_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
    /// Extra headers sent with every request.
    pub headers: Option<Headers>,
}

/// The Anthropic provider.
pub struct AnthropicProvider {
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create a provider from settings. Authentication uses the
    /// `x-api-key` header rather than a bearer token.
    pub fn new(settings: AnthropicProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "ANTHROPIC_API_KEY", "Anthropic")?;
        let extra_headers = settings.headers.unwrap_or_default();

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("x-api-key".to_string(), api_key.clone());
            headers.insert("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string());
            headers.extend(extra_headers.clone());
            headers
        });

        Ok(Self {
            config: AnthropicConfig {
                provider: "anthropic.messages".to_string(),
                base_url: settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                headers,
                client: reqwest::Client::new(),
            },
        })
    }
}

impl Provider for AnthropicProvider {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(AnthropicMessagesLanguageModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create an Anthropic provider with default settings.
pub fn create_anthropic() -> Result<AnthropicProvider, ProviderError> {
    AnthropicProvider::new(AnthropicProviderSettings::default())
}
