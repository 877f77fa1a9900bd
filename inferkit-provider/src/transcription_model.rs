use crate::error::ProviderError;
use crate::language_model::call_warning::CallWarning;
use crate::shared::{Headers, ProviderMetadata, ProviderOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// An audio transcription model.
#[async_trait]
pub trait TranscriptionModel: Send + Sync {
    /// Name of the provider.
    fn provider(&self) -> &str;

    /// Provider-specific model id.
    fn model_id(&self) -> &str;

    /// Transcribe the given audio. The audio bytes are opaque to the core;
    /// the media type tells the service what it is receiving.
    async fn do_transcribe(
        &self,
        options: TranscriptionCallOptions,
    ) -> Result<TranscriptionResponse, ProviderError>;
}

/// Options for a transcription call.
#[derive(Debug, Clone)]
pub struct TranscriptionCallOptions {
    /// The audio bytes.
    pub audio: Vec<u8>,

    /// MIME type of the audio, e.g. `"audio/wav"`.
    pub media_type: String,

    /// Additional HTTP headers for this request.
    pub headers: Option<Headers>,

    /// Provider-specific options.
    pub provider_options: Option<ProviderOptions>,

    /// Cancellation signal.
    pub abort_signal: Option<CancellationToken>,
}

impl TranscriptionCallOptions {
    /// Create options for the given audio.
    pub fn new(audio: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            audio,
            media_type: media_type.into(),
            headers: None,
            provider_options: None,
            abort_signal: None,
        }
    }
}

/// A timed segment of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    /// The segment text.
    pub text: String,

    /// Segment start, in seconds from the beginning of the audio.
    pub start_seconds: f64,

    /// Segment end, in seconds from the beginning of the audio.
    pub end_seconds: f64,
}

/// Response from a transcription call.
#[derive(Debug, Clone)]
pub struct TranscriptionResponse {
    /// The full transcript.
    pub text: String,

    /// Timed segments, when the service reports them.
    pub segments: Vec<TranscriptSegment>,

    /// Detected language (ISO 639-1), when reported.
    pub language: Option<String>,

    /// Audio duration in seconds, when reported.
    pub duration_seconds: Option<f64>,

    /// Non-fatal warnings from the call.
    pub warnings: Vec<CallWarning>,

    /// Provider-specific metadata.
    pub provider_metadata: Option<ProviderMetadata>,

    /// Response metadata.
    pub response: Option<TranscriptionResponseMetadata>,
}

/// Metadata echoed with a transcription response.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionResponseMetadata {
    /// The model id the server actually used.
    pub model_id: Option<String>,

    /// Response headers.
    pub headers: Option<Headers>,
}
