use crate::metadata_extractor::PerplexityMetadataExtractor;
use async_trait::async_trait;
use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_provider::language_model::call_options::CallOptions;
use inferkit_provider::language_model::content::{Content, Source};
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    GenerateResponse, LanguageModel, Provider, ProviderError, StreamResponse,
};
use inferkit_provider_utils::api_key::load_api_key;
use serde_json::Value;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Settings for the Perplexity provider.
#[derive(Debug, Clone, Default)]
pub struct PerplexityProviderSettings {
    /// Explicit API key; falls back to `PERPLEXITY_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The Perplexity provider.
pub struct PerplexityProvider {
    config: OpenAICompatibleConfig,
}

/// Chat model that lifts citation metadata into source content parts.
struct PerplexityLanguageModel {
    inner: ChatLanguageModel,
}

#[async_trait]
impl LanguageModel for PerplexityLanguageModel {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResponse, ProviderError> {
        let mut response = self.inner.do_generate(options).await?;

        let citations: Vec<String> = response
            .provider_metadata
            .as_ref()
            .and_then(|metadata| metadata.get("perplexity"))
            .and_then(|inner| inner.get("citations"))
            .and_then(Value::as_array)
            .map(|array| {
                array
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        for (index, url) in citations.into_iter().enumerate() {
            response.content.push(Content::Source(Source {
                id: index.to_string(),
                url,
                title: None,
                provider_metadata: None,
            }));
        }

        Ok(response)
    }

    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError> {
        // Citations arrive with the final chunk and surface through the
        // finish event's provider metadata.
        self.inner.do_stream(options).await
    }
}

impl PerplexityProvider {
    /// Create a provider from settings.
    pub fn new(settings: PerplexityProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(
            settings.api_key.as_deref(),
            "PERPLEXITY_API_KEY",
            "Perplexity",
        )?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        let config = OpenAICompatibleConfig::new(
            "perplexity.chat",
            settings
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            headers,
        )
        .with_metadata_extractor(Arc::new(PerplexityMetadataExtractor));

        Ok(Self { config })
    }
}

impl Provider for PerplexityProvider {
    fn provider_id(&self) -> &str {
        "perplexity"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(PerplexityLanguageModel {
            inner: ChatLanguageModel::new(model_id, self.config.clone()),
        }))
    }
}

/// Create a Perplexity provider with default settings.
pub fn create_perplexity() -> Result<PerplexityProvider, ProviderError> {
    PerplexityProvider::new(PerplexityProviderSettings::default())
}
