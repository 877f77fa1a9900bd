use serde::{Deserialize, Serialize};

/// Provider options under the `mistral` namespace.
///
/// These merge into the request body verbatim, so the field names match
/// Mistral's wire parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MistralOptions {
    /// Inject Mistral's safety prompt ahead of the conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_prompt: Option<bool>,

    /// Maximum number of document images per request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_image_limit: Option<u32>,

    /// Maximum number of document pages per request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_page_limit: Option<u32>,
}
