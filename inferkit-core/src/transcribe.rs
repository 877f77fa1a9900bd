//! Audio transcription.

use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::{
    ProviderError, TranscriptSegment, TranscriptionCallOptions, TranscriptionModel,
};
use std::sync::Arc;

/// Result of a transcription call.
#[derive(Debug, Clone)]
pub struct TranscribeResult {
    /// The full transcript.
    pub text: String,
    /// Timed segments, when the service reports them.
    pub segments: Vec<TranscriptSegment>,
    /// Detected language, when reported.
    pub language: Option<String>,
    /// Audio duration in seconds, when reported.
    pub duration_seconds: Option<f64>,
    /// Non-fatal warnings.
    pub warnings: Vec<CallWarning>,
}

/// Transcribe the given audio bytes.
pub async fn transcribe(
    model: &Arc<dyn TranscriptionModel>,
    options: TranscriptionCallOptions,
) -> Result<TranscribeResult, ProviderError> {
    if options.audio.is_empty() {
        return Err(ProviderError::invalid_argument(
            "audio",
            "audio must not be empty",
        ));
    }

    let response = model.do_transcribe(options).await?;
    Ok(TranscribeResult {
        text: response.text,
        segments: response.segments,
        language: response.language,
        duration_seconds: response.duration_seconds,
        warnings: response.warnings,
    })
}
