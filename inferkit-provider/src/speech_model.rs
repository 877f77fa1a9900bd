use crate::error::ProviderError;
use crate::language_model::call_warning::CallWarning;
use crate::shared::{Headers, ProviderOptions};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A speech synthesis model.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Name of the provider.
    fn provider(&self) -> &str;

    /// Provider-specific model id.
    fn model_id(&self) -> &str;

    /// Synthesise speech for the given text, returning raw audio bytes
    /// with the MIME type advertised by the service.
    async fn do_generate(&self, options: SpeechCallOptions)
    -> Result<SpeechResponse, ProviderError>;
}

/// Options for a speech synthesis call.
#[derive(Debug, Clone)]
pub struct SpeechCallOptions {
    /// The text to speak.
    pub text: String,

    /// Voice to use, where the provider offers several.
    pub voice: Option<String>,

    /// Requested output format, e.g. `"mp3"`.
    pub output_format: Option<String>,

    /// Speaking speed multiplier.
    pub speed: Option<f64>,

    /// Language hint.
    pub language: Option<String>,

    /// Additional HTTP headers for this request.
    pub headers: Option<Headers>,

    /// Provider-specific options.
    pub provider_options: Option<ProviderOptions>,

    /// Cancellation signal.
    pub abort_signal: Option<CancellationToken>,
}

impl SpeechCallOptions {
    /// Create options for the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            output_format: None,
            speed: None,
            language: None,
            headers: None,
            provider_options: None,
            abort_signal: None,
        }
    }
}

/// Response from a speech synthesis call.
#[derive(Debug, Clone)]
pub struct SpeechResponse {
    /// The audio as raw bytes.
    pub audio: Vec<u8>,

    /// MIME type of the audio, when the service reports one.
    pub media_type: Option<String>,

    /// Non-fatal warnings from the call.
    pub warnings: Vec<CallWarning>,

    /// Response metadata.
    pub response: Option<SpeechResponseMetadata>,
}

/// Metadata echoed with a speech response.
#[derive(Debug, Clone, Default)]
pub struct SpeechResponseMetadata {
    /// The model id the server actually used.
    pub model_id: Option<String>,

    /// Response headers.
    pub headers: Option<Headers>,
}
