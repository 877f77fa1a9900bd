//! Wire types for the Converse envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A conversation message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverseMessage {
    /// `"user"` or `"assistant"`.
    pub role: &'static str,
    /// Content blocks.
    pub content: Vec<ConverseContent>,
}

/// A content block. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ConverseImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<ConverseToolUse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ConverseToolResult>,
}

/// An image block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverseImage {
    /// Image format, e.g. `"png"`.
    pub format: String,
    pub source: ConverseImageSource,
}

/// Image bytes, base64 encoded on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverseImageSource {
    pub bytes: String,
}

/// A tool call being replayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseToolUse {
    pub tool_use_id: String,
    pub name: String,
    pub input: Value,
}

/// A tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseToolResult {
    pub tool_use_id: String,
    pub content: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseResponse {
    pub output: ConverseOutput,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<ConverseUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ConverseOutput {
    pub message: ConverseOutputMessage,
}

#[derive(Debug, Deserialize)]
pub struct ConverseOutputMessage {
    #[serde(default)]
    pub content: Vec<ConverseOutputContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseOutputContent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tool_use: Option<ConverseOutputToolUse>,
    #[serde(default)]
    pub reasoning_content: Option<ReasoningContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseOutputToolUse {
    pub tool_use_id: String,
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningContentBlock {
    #[serde(default)]
    pub reasoning_text: Option<ReasoningText>,
}

#[derive(Debug, Deserialize)]
pub struct ReasoningText {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// One frame of the converse stream, after event-stream unwrapping.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseStreamFrame {
    #[serde(default)]
    pub message_start: Option<Value>,
    #[serde(default)]
    pub content_block_start: Option<StreamBlockStart>,
    #[serde(default)]
    pub content_block_delta: Option<StreamBlockDelta>,
    #[serde(default)]
    pub content_block_stop: Option<StreamBlockStop>,
    #[serde(default)]
    pub message_stop: Option<StreamMessageStop>,
    #[serde(default)]
    pub metadata: Option<StreamMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamBlockStart {
    #[serde(default)]
    pub content_block_index: u32,
    #[serde(default)]
    pub start: Option<StreamBlockStartPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamBlockStartPayload {
    #[serde(default)]
    pub tool_use: Option<StreamToolUseStart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamToolUseStart {
    pub tool_use_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamBlockDelta {
    #[serde(default)]
    pub content_block_index: u32,
    #[serde(default)]
    pub delta: Option<StreamDeltaPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDeltaPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tool_use: Option<StreamToolUseDelta>,
    #[serde(default)]
    pub reasoning_content: Option<ReasoningContentBlock>,
}

#[derive(Debug, Deserialize)]
pub struct StreamToolUseDelta {
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamBlockStop {
    #[serde(default)]
    pub content_block_index: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMessageStop {
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreamMetadata {
    #[serde(default)]
    pub usage: Option<ConverseUsage>,
}
