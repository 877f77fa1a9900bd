use crate::transcription::{GladiaTranscriptionConfig, GladiaTranscriptionModel};
use inferkit_provider::shared::Headers;
use inferkit_provider::{Provider, ProviderError, TranscriptionModel};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.gladia.io";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for the Gladia provider.
#[derive(Debug, Clone, Default)]
pub struct GladiaProviderSettings {
    /// Explicit API key; falls back to `GLADIA_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
    /// Interval between result polls (default 2 s).
    pub poll_interval: Option<Duration>,
    /// Overall job deadline (default 300 s).
    pub poll_timeout: Option<Duration>,
}

/// The Gladia provider.
pub struct GladiaProvider {
    config: GladiaTranscriptionConfig,
}

impl GladiaProvider {
    /// Create a provider from settings. Authentication uses the
    /// `x-gladia-key` header.
    pub fn new(settings: GladiaProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "GLADIA_API_KEY", "Gladia")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("x-gladia-key".to_string(), api_key.clone());
            headers
        });

        Ok(Self {
            config: GladiaTranscriptionConfig {
                provider: "gladia".to_string(),
                base_url: settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                headers,
                client: reqwest::Client::new(),
                poll_interval: settings.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
                poll_timeout: settings.poll_timeout.unwrap_or(DEFAULT_POLL_TIMEOUT),
            },
        })
    }
}

impl Provider for GladiaProvider {
    fn provider_id(&self) -> &str {
        "gladia"
    }

    fn transcription_model(
        &self,
        _model_id: &str,
    ) -> Result<Arc<dyn TranscriptionModel>, ProviderError> {
        Ok(Arc::new(GladiaTranscriptionModel::new(self.config.clone())))
    }
}

/// Create a Gladia provider with default settings.
pub fn create_gladia() -> Result<GladiaProvider, ProviderError> {
    GladiaProvider::new(GladiaProviderSettings::default())
}
