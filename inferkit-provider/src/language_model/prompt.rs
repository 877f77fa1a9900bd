use crate::language_model::content::ToolResultOutput;
use crate::language_model::data_content::DataContent;
use crate::shared::ProviderOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A prompt is an ordered list of messages.
pub type Prompt = Vec<Message>;

/// A message in a prompt.
///
/// The role determines which parts the message may carry. Part order within
/// a message is significant and is preserved end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System instruction. At most one per prompt, always first.
    System(SystemMessage),
    /// User input.
    User(UserMessage),
    /// Assistant output fed back into the conversation.
    Assistant(AssistantMessage),
    /// Tool results answering earlier assistant tool calls.
    Tool(ToolMessage),
}

/// A system message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    /// The instruction text.
    pub content: String,
    /// Provider-specific options for this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

/// A user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    /// The message parts, in order.
    pub content: Vec<UserPart>,
    /// Provider-specific options for this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

/// Parts a user message may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UserPart {
    /// Text.
    Text(TextPart),
    /// An image or other file.
    File(FilePart),
}

/// An assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// The message parts, in order.
    pub content: Vec<AssistantPart>,
    /// Provider-specific options for this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

/// Parts an assistant message may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AssistantPart {
    /// Text.
    Text(TextPart),
    /// A file produced by the model.
    File(FilePart),
    /// Reasoning text.
    Reasoning(ReasoningPart),
    /// A tool call the model made.
    ToolCall(ToolCallPart),
}

/// A tool message carrying results for earlier tool calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMessage {
    /// The tool results.
    pub content: Vec<ToolResultPart>,
    /// Provider-specific options for this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

/// A text part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    /// The text.
    pub text: String,
    /// Provider-specific options for this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

/// A file part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePart {
    /// The file data.
    pub data: DataContent,
    /// MIME type of the data.
    pub media_type: String,
    /// Optional filename hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Provider-specific options for this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

/// A reasoning part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningPart {
    /// The reasoning text.
    pub text: String,
    /// Provider-specific options for this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

/// A tool call part inside an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPart {
    /// Unique id of the call within the assistant turn.
    pub tool_call_id: String,
    /// Name of the tool.
    pub tool_name: String,
    /// The argument object.
    pub input: Value,
    /// Provider-specific options for this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

/// A tool result part inside a tool message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultPart {
    /// Id of the originating call.
    pub tool_call_id: String,
    /// Name of the tool that ran.
    pub tool_name: String,
    /// The result payload.
    pub output: ToolResultOutput,
    /// Provider-specific options for this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<ProviderOptions>,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(SystemMessage {
            content: content.into(),
            provider_options: None,
        })
    }

    /// Create a user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::User(UserMessage {
            content: vec![UserPart::Text(TextPart::new(text))],
            provider_options: None,
        })
    }

    /// Create an assistant message with a single text part.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant(AssistantMessage {
            content: vec![AssistantPart::Text(TextPart::new(text))],
            provider_options: None,
        })
    }

    /// Create a tool message with a single result.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: ToolResultOutput,
    ) -> Self {
        Self::Tool(ToolMessage {
            content: vec![ToolResultPart {
                tool_call_id: tool_call_id.into(),
                tool_name: tool_name.into(),
                output,
                provider_options: None,
            }],
            provider_options: None,
        })
    }

    /// The role of this message as a wire string.
    pub fn role(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::User(_) => "user",
            Self::Assistant(_) => "assistant",
            Self::Tool(_) => "tool",
        }
    }
}

impl TextPart {
    /// Create a text part.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider_options: None,
        }
    }
}

impl FilePart {
    /// Create a file part.
    pub fn new(data: DataContent, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
            filename: None,
            provider_options: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tags() {
        let message = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(message["role"], "user");
        assert_eq!(message["content"][0]["type"], "text");
    }

    #[test]
    fn roles() {
        assert_eq!(Message::system("s").role(), "system");
        assert_eq!(Message::assistant("a").role(), "assistant");
        assert_eq!(
            Message::tool_result("id", "t", ToolResultOutput::Text { value: "v".into() }).role(),
            "tool"
        );
    }
}
