use serde::{Deserialize, Serialize};

/// Provider options under the `gladia` namespace.
///
/// A typed subset of Gladia's transcription options; anything else can be
/// passed through `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GladiaOptions {
    /// Context to bias the transcription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_prompt: Option<String>,

    /// Domain vocabulary to boost.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_vocabulary: Option<Vec<String>>,

    /// Detect the spoken language automatically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_language: Option<bool>,

    /// Allow switching languages mid-audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_code_switching: Option<bool>,

    /// Fixed language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Speaker diarization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diarization: Option<bool>,

    /// Translate the transcript.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<bool>,

    /// Summarise the transcript.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarization: Option<bool>,

    /// Named entity recognition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_entity_recognition: Option<bool>,

    /// Sentence-level segmentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentences: Option<bool>,

    /// Opaque pass-through merged into the job request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Map<String, serde_json::Value>>,
}
