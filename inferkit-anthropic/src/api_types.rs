//! Wire types for the Messages API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A conversation message in wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicMessage {
    /// `"user"` or `"assistant"`.
    pub role: &'static str,
    /// Content blocks.
    pub content: Vec<AnthropicContent>,
}

/// A request content block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContent {
    /// Text block.
    Text { text: String },
    /// Image block.
    Image { source: AnthropicImageSource },
    /// A tool call being replayed into the conversation.
    ToolUse { id: String, name: String, input: Value },
    /// A tool result; rides inside a user message.
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Image source forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicImageSource {
    /// Inline base64 data.
    Base64 { media_type: String, data: String },
    /// A URL the service fetches.
    Url { url: String },
}

/// A tool definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicTool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub content: Vec<ResponseContent>,
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
    pub usage: AnthropicUsage,
}

/// A response content block.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseContent {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
        #[serde(default)]
        signature: Option<String>,
    },
    RedactedThinking {
        data: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
}

/// Usage accounting.
#[derive(Debug, Default, Deserialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
}

/// A streaming SSE event.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamEvent {
    /// Keep-alive.
    Ping,
    /// First event: seeds usage and response metadata.
    MessageStart { message: MessageStartData },
    /// A content block opened at a server-assigned index.
    ContentBlockStart {
        index: u32,
        content_block: ContentBlockStart,
    },
    /// A delta for the block at the given index.
    ContentBlockDelta { index: u32, delta: ContentBlockDelta },
    /// The block at the given index closed.
    ContentBlockStop { index: u32 },
    /// Carries the final stop reason and output token count.
    MessageDelta {
        delta: MessageDeltaData,
        #[serde(default)]
        usage: Option<DeltaUsage>,
    },
    /// Stream terminator.
    MessageStop,
    /// Server-reported error.
    Error { error: StreamErrorData },
}

#[derive(Debug, Deserialize)]
pub struct MessageStartData {
    pub id: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlockStart {
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    RedactedThinking {
        #[serde(default)]
        data: String,
    },
    ToolUse {
        id: String,
        name: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlockDelta {
    TextDelta { text: String },
    ThinkingDelta { thinking: String },
    SignatureDelta { signature: String },
    InputJsonDelta { partial_json: String },
}

#[derive(Debug, Deserialize)]
pub struct MessageDeltaData {
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub stop_sequence: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeltaUsage {
    #[serde(default)]
    pub output_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub struct StreamErrorData {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_typed_stream_events() {
        let event: AnthropicStreamEvent = serde_json::from_str(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"4"}}"#,
        )
        .unwrap();
        match event {
            AnthropicStreamEvent::ContentBlockDelta { index, delta } => {
                assert_eq!(index, 0);
                assert!(matches!(delta, ContentBlockDelta::TextDelta { text } if text == "4"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn deserializes_message_start_usage() {
        let event: AnthropicStreamEvent = serde_json::from_str(
            r#"{"type":"message_start","message":{"id":"msg_1","model":"claude-3-haiku","usage":{"input_tokens":5,"output_tokens":0}}}"#,
        )
        .unwrap();
        match event {
            AnthropicStreamEvent::MessageStart { message } => {
                assert_eq!(message.usage.unwrap().input_tokens, 5);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn serializes_tool_result_block() {
        let block = AnthropicContent::ToolResult {
            tool_use_id: "toolu_1".into(),
            content: "ok".into(),
            is_error: None,
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert_eq!(value["tool_use_id"], "toolu_1");
        assert!(value.get("is_error").is_none());
    }
}
