//! Wire types for the chat-completions protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat message in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum WireMessage {
    /// System instruction.
    System {
        content: String,
    },
    /// User turn; content is a plain string or a part array.
    User {
        content: WireUserContent,
    },
    /// Assistant turn with optional tool calls.
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<WireToolCall>>,
    },
    /// Tool result answering an assistant tool call.
    Tool {
        content: String,
        tool_call_id: String,
    },
}

/// User content: a plain string or multimodal parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireUserContent {
    Text(String),
    Parts(Vec<WireContentPart>),
}

/// One part of a multimodal user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireContentPart {
    Text { text: String },
    ImageUrl { image_url: WireImageUrl },
}

/// An image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireImageUrl {
    pub url: String,
}

/// An assistant tool call in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: WireFunctionCall,
}

/// The function half of a tool call; `arguments` is a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    pub arguments: String,
}

/// A tool definition sent with the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: WireFunctionDefinition,
}

/// Function tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub id: Option<String>,
    pub created: Option<i64>,
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
    /// Reasoning text, under either of the field names providers use.
    pub reasoning_content: Option<String>,
    pub reasoning: Option<String>,
    pub tool_calls: Option<Vec<ChatResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseToolCall {
    pub id: Option<String>,
    pub function: ChatResponseFunction,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseFunction {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
    pub completion_tokens_details: Option<CompletionTokensDetails>,
    pub prompt_tokens_details: Option<PromptTokensDetails>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionTokensDetails {
    pub reasoning_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PromptTokensDetails {
    pub cached_tokens: Option<u64>,
}

/// Streaming chunk body.
#[derive(Debug, Deserialize)]
pub struct ChatStreamChunk {
    pub id: Option<String>,
    pub created: Option<i64>,
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatStreamChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatStreamChoice {
    pub delta: ChatStreamDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatStreamDelta {
    pub content: Option<String>,
    pub reasoning_content: Option<String>,
    pub reasoning: Option<String>,
    pub tool_calls: Option<Vec<ChatStreamToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatStreamToolCall {
    pub index: Option<u64>,
    pub id: Option<String>,
    pub function: Option<ChatStreamFunction>,
}

#[derive(Debug, Deserialize)]
pub struct ChatStreamFunction {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

impl ChatUsage {
    /// Convert to the canonical usage type.
    pub fn to_usage(&self) -> inferkit_provider::language_model::usage::Usage {
        inferkit_provider::language_model::usage::Usage {
            input_tokens: self.prompt_tokens.unwrap_or(0),
            output_tokens: self.completion_tokens.unwrap_or(0),
            total_tokens: self.total_tokens.unwrap_or(0),
            reasoning_tokens: self
                .completion_tokens_details
                .as_ref()
                .and_then(|details| details.reasoning_tokens)
                .unwrap_or(0),
            cached_input_tokens: self
                .prompt_tokens_details
                .as_ref()
                .and_then(|details| details.cached_tokens)
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferkit_provider::language_model::finish_reason::FinishReason;

    use crate::chat::map_finish_reason::map_openai_compatible_finish_reason;

    #[test]
    fn parses_a_plain_completion_response() {
        let body = r#"{
            "id": "chatcmpl-1",
            "created": 1719000000,
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": "Hi"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();

        let choice = &response.choices[0];
        assert_eq!(choice.message.content.as_deref(), Some("Hi"));
        assert_eq!(
            map_openai_compatible_finish_reason(choice.finish_reason.as_deref()),
            FinishReason::Stop
        );

        let usage = response.usage.unwrap().to_usage();
        assert_eq!(usage.input_tokens, 3);
        assert_eq!(usage.output_tokens, 1);
        assert_eq!(usage.total_tokens, 4);
        assert_eq!(usage.total(), usage.input_tokens + usage.output_tokens);
    }

    #[test]
    fn parses_tool_calls_and_reasoning_fields() {
        let body = r#"{
            "choices": [{
                "message": {
                    "content": null,
                    "reasoning_content": "thinking...",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "add", "arguments": "{\"a\":2,\"b\":3}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let message = &response.choices[0].message;
        assert_eq!(message.reasoning_content.as_deref(), Some("thinking..."));
        let calls = message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id.as_deref(), Some("call_1"));
        assert_eq!(calls[0].function.name, "add");
        assert_eq!(calls[0].function.arguments, "{\"a\":2,\"b\":3}");
    }

    #[test]
    fn wire_messages_round_trip_roles() {
        let messages = vec![
            WireMessage::System {
                content: "Be brief.".into(),
            },
            WireMessage::User {
                content: WireUserContent::Text("hi".into()),
            },
            WireMessage::Tool {
                content: "42".into(),
                tool_call_id: "call_1".into(),
            },
        ];
        let value = serde_json::to_value(&messages).unwrap();
        assert_eq!(value[0]["role"], "system");
        assert_eq!(value[1]["role"], "user");
        assert_eq!(value[2]["role"], "tool");

        let parsed: Vec<WireMessage> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, messages);
    }
}
