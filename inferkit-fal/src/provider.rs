use crate::transcription::{FalTranscriptionConfig, FalTranscriptionModel};
use inferkit_provider::shared::Headers;
use inferkit_provider::{Provider, ProviderError, TranscriptionModel};
use inferkit_provider_utils::api_key::load_api_key;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_QUEUE_URL: &str = "https://queue.fal.run";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for the FAL provider.
#[derive(Debug, Clone, Default)]
pub struct FalProviderSettings {
    /// Explicit API key; falls back to `FAL_API_KEY`.
    pub api_key: Option<String>,
    /// Override the queue base URL.
    pub queue_url: Option<String>,
    /// Interval between status polls (default 2 s).
    pub poll_interval: Option<Duration>,
    /// Overall job deadline (default 300 s).
    pub poll_timeout: Option<Duration>,
}

/// The FAL provider.
pub struct FalProvider {
    config: FalTranscriptionConfig,
}

impl FalProvider {
    /// Create a provider from settings. FAL uses `Authorization: Key …`.
    pub fn new(settings: FalProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "FAL_API_KEY", "FAL")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Key {api_key}"));
            headers
        });

        Ok(Self {
            config: FalTranscriptionConfig {
                provider: "fal".to_string(),
                queue_url: settings
                    .queue_url
                    .unwrap_or_else(|| DEFAULT_QUEUE_URL.to_string()),
                headers,
                client: reqwest::Client::new(),
                poll_interval: settings.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
                poll_timeout: settings.poll_timeout.unwrap_or(DEFAULT_POLL_TIMEOUT),
            },
        })
    }
}

impl Provider for FalProvider {
    fn provider_id(&self) -> &str {
        "fal"
    }

    fn transcription_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn TranscriptionModel>, ProviderError> {
        Ok(Arc::new(FalTranscriptionModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create a FAL provider with default settings.
pub fn create_fal() -> Result<FalProvider, ProviderError> {
    FalProvider::new(FalProviderSettings::default())
}
