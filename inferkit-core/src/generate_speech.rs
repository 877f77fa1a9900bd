//! Speech synthesis.

use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::{ProviderError, SpeechCallOptions, SpeechModel};
use std::sync::Arc;

/// Result of a speech synthesis call.
#[derive(Debug, Clone)]
pub struct GenerateSpeechResult {
    /// The audio as raw bytes.
    pub audio: Vec<u8>,
    /// MIME type of the audio, when the service reports one.
    pub media_type: Option<String>,
    /// Non-fatal warnings.
    pub warnings: Vec<CallWarning>,
}

/// Synthesise speech for the given text.
pub async fn generate_speech(
    model: &Arc<dyn SpeechModel>,
    options: SpeechCallOptions,
) -> Result<GenerateSpeechResult, ProviderError> {
    if options.text.is_empty() {
        return Err(ProviderError::invalid_argument(
            "text",
            "speech text must not be empty",
        ));
    }

    let response = model.do_generate(options).await?;
    if response.audio.is_empty() {
        return Err(ProviderError::NoContentGenerated {
            message: "no audio was generated".to_string(),
        });
    }

    Ok(GenerateSpeechResult {
        audio: response.audio,
        media_type: response.media_type,
        warnings: response.warnings,
    })
}
