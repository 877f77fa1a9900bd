//! Wire types for the GenerateContent protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleContent {
    /// `"user"` or `"model"`.
    pub role: &'static str,
    /// The content parts.
    pub parts: Vec<GooglePart>,
}

/// One content part. Exactly one of the payload fields is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePart {
    /// Text payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Marks a text part as model thought.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    /// Inline binary data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<GoogleInlineData>,
    /// A provider-hosted file reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<GoogleFileData>,
    /// A function call made by the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<GoogleFunctionCall>,
    /// A function response answering an earlier call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<GoogleFunctionResponse>,
}

/// Inline binary data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleInlineData {
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

/// A file reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleFileData {
    pub file_uri: String,
    pub mime_type: String,
}

/// A function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// A function response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleFunctionResponse {
    pub name: String,
    pub response: Value,
}

/// Non-streaming response body; stream lines share this shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<GoogleCandidate>,
    #[serde(default)]
    pub usage_metadata: Option<GoogleUsageMetadata>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCandidate {
    #[serde(default)]
    pub content: Option<GoogleCandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCandidateContent {
    #[serde(default)]
    pub parts: Vec<GoogleResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thought: Option<bool>,
    #[serde(default)]
    pub function_call: Option<GoogleFunctionCall>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u64>,
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
    #[serde(default)]
    pub total_token_count: Option<u64>,
    #[serde(default)]
    pub thoughts_token_count: Option<u64>,
    #[serde(default)]
    pub cached_content_token_count: Option<u64>,
}

impl GoogleUsageMetadata {
    /// Convert to the canonical usage type.
    pub fn to_usage(&self) -> inferkit_provider::language_model::usage::Usage {
        inferkit_provider::language_model::usage::Usage {
            input_tokens: self.prompt_token_count.unwrap_or(0),
            output_tokens: self.candidates_token_count.unwrap_or(0),
            total_tokens: self.total_token_count.unwrap_or(0),
            reasoning_tokens: self.thoughts_token_count.unwrap_or(0),
            cached_input_tokens: self.cached_content_token_count.unwrap_or(0),
        }
    }
}

impl GooglePart {
    /// A plain text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}
