use crate::language_model::data_content::DataContent;
use crate::shared::ProviderMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One part of a model's output.
///
/// Content is a closed sum; consumers pattern-match on the tag rather than
/// dispatching through any shared behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Content {
    /// Plain text.
    Text(Text),
    /// Reasoning text, with optional provider metadata (e.g. signatures).
    Reasoning(Reasoning),
    /// A generated or referenced file.
    File(File),
    /// A citation from a search-augmented provider.
    Source(Source),
    /// A tool invocation requested by the model.
    ToolCall(ToolCall),
    /// A tool result echoed by the provider.
    ToolResult(ToolResult),
}

/// Text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// The text.
    pub text: String,
    /// Provider-specific metadata for this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
}

/// Reasoning content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    /// The reasoning text.
    pub text: String,
    /// Provider-specific metadata for this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
}

/// File content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// MIME type of the file.
    pub media_type: String,
    /// The file data.
    pub data: DataContent,
}

/// A citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Adapter-assigned id for this source.
    pub id: String,
    /// URL of the cited document.
    pub url: String,
    /// Title of the cited document, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Provider-specific metadata for this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique id of this call within the assistant turn.
    pub tool_call_id: String,
    /// Name of the tool to invoke.
    pub tool_name: String,
    /// JSON-encoded argument object, exactly as the provider produced it.
    pub input: String,
}

/// A tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the originating tool call.
    pub tool_call_id: String,
    /// Name of the tool that produced the result.
    pub tool_name: String,
    /// The result payload.
    pub output: ToolResultOutput,
}

/// The payload of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ToolResultOutput {
    /// A successful text result.
    Text {
        /// The text.
        value: String,
    },
    /// A failed result carried as text.
    ErrorText {
        /// The error text.
        value: String,
    },
    /// A successful JSON result.
    Json {
        /// The JSON value.
        value: Value,
    },
    /// A failed result carried as JSON.
    ErrorJson {
        /// The JSON value.
        value: Value,
    },
}

impl Text {
    /// Create a text part.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider_metadata: None,
        }
    }
}

impl Reasoning {
    /// Create a reasoning part.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider_metadata: None,
        }
    }
}

impl ToolCall {
    /// Create a tool call.
    pub fn new(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            input: input.into(),
        }
    }
}

impl ToolResultOutput {
    /// Whether this payload represents a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ErrorText { .. } | Self::ErrorJson { .. })
    }

    /// Render the payload as a string, JSON-encoding structured values.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text { value } | Self::ErrorText { value } => value.clone(),
            Self::Json { value } | Self::ErrorJson { value } => {
                serde_json::to_string(value).unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_tags() {
        let text = serde_json::to_value(Content::Text(Text::new("hi"))).unwrap();
        assert_eq!(text["type"], "text");

        let call = serde_json::to_value(Content::ToolCall(ToolCall::new("id", "t", "{}"))).unwrap();
        assert_eq!(call["type"], "tool-call");
    }

    #[test]
    fn tool_result_output_error_flag() {
        assert!(
            ToolResultOutput::ErrorJson {
                value: json!({"oops": true})
            }
            .is_error()
        );
        assert!(
            !ToolResultOutput::Text {
                value: "fine".into()
            }
            .is_error()
        );
    }
}
