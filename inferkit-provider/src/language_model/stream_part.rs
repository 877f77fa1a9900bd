use crate::language_model::call_warning::CallWarning;
use crate::language_model::content::{File, Source, ToolCall};
use crate::language_model::finish_reason::FinishReason;
use crate::language_model::response_metadata::ResponseMetadata;
use crate::language_model::usage::Usage;
use crate::shared::ProviderMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event in a generation stream.
///
/// A stream is a finite sequence following the grammar: optional response
/// metadata, any number of interleaved blocks, exactly one trailing finish.
/// A block is a start/delta*/end run of events sharing an adapter-assigned
/// id; blocks of different kinds may interleave, so consumers must key
/// state by id rather than by arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamPart {
    /// A text block opened.
    TextStart {
        /// Block id.
        id: String,
    },
    /// A fragment of a text block.
    TextDelta {
        /// Block id.
        id: String,
        /// The text fragment.
        delta: String,
    },
    /// A text block closed.
    TextEnd {
        /// Block id.
        id: String,
    },

    /// A reasoning block opened.
    ReasoningStart {
        /// Block id.
        id: String,
        /// Provider-specific metadata for this block.
        #[serde(skip_serializing_if = "Option::is_none")]
        provider_metadata: Option<ProviderMetadata>,
    },
    /// A fragment of a reasoning block.
    ReasoningDelta {
        /// Block id.
        id: String,
        /// The reasoning fragment.
        delta: String,
    },
    /// A reasoning block closed.
    ReasoningEnd {
        /// Block id.
        id: String,
    },

    /// Tool-call argument streaming started.
    #[serde(rename_all = "camelCase")]
    ToolInputStart {
        /// Block id (the tool-call id).
        id: String,
        /// Name of the tool being called.
        tool_name: String,
    },
    /// A fragment of tool-call arguments.
    ToolInputDelta {
        /// Block id.
        id: String,
        /// The argument JSON fragment.
        delta: String,
    },
    /// Tool-call argument streaming ended.
    ToolInputEnd {
        /// Block id.
        id: String,
    },

    /// A consolidated tool call with its complete arguments.
    ToolCall(ToolCall),

    /// A citation.
    Source(Source),

    /// A file produced by the model.
    File(File),

    /// First event of a stream, carrying call warnings.
    StreamStart {
        /// Non-fatal warnings from request preparation.
        warnings: Vec<CallWarning>,
    },

    /// Server-echoed response metadata, emitted once when known.
    ResponseMetadata(ResponseMetadata),

    /// Terminal event with the finish reason and final usage.
    #[serde(rename_all = "camelCase")]
    Finish {
        /// Why generation finished.
        finish_reason: FinishReason,
        /// Final token usage.
        usage: Usage,
        /// Provider-specific metadata for the whole response.
        #[serde(skip_serializing_if = "Option::is_none")]
        provider_metadata: Option<ProviderMetadata>,
    },

    /// Raw provider chunk, only emitted when raw chunks were requested.
    Raw {
        /// The raw chunk.
        raw: Value,
    },

    /// A mid-stream failure. The stream ends after this event; parts
    /// already delivered remain valid.
    Error {
        /// The error, serialized for the consumer.
        error: Value,
    },
}

impl StreamPart {
    /// Create a text-start event.
    pub fn text_start(id: impl Into<String>) -> Self {
        Self::TextStart { id: id.into() }
    }

    /// Create a text-delta event.
    pub fn text_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::TextDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    /// Create a text-end event.
    pub fn text_end(id: impl Into<String>) -> Self {
        Self::TextEnd { id: id.into() }
    }

    /// Create a reasoning-start event.
    pub fn reasoning_start(id: impl Into<String>) -> Self {
        Self::ReasoningStart {
            id: id.into(),
            provider_metadata: None,
        }
    }

    /// Create a reasoning-delta event.
    pub fn reasoning_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::ReasoningDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    /// Create a reasoning-end event.
    pub fn reasoning_end(id: impl Into<String>) -> Self {
        Self::ReasoningEnd { id: id.into() }
    }

    /// Create a tool-input-start event.
    pub fn tool_input_start(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self::ToolInputStart {
            id: id.into(),
            tool_name: tool_name.into(),
        }
    }

    /// Create a tool-input-delta event.
    pub fn tool_input_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::ToolInputDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    /// Create a tool-input-end event.
    pub fn tool_input_end(id: impl Into<String>) -> Self {
        Self::ToolInputEnd { id: id.into() }
    }

    /// Create a stream-start event.
    pub fn stream_start(warnings: Vec<CallWarning>) -> Self {
        Self::StreamStart { warnings }
    }

    /// Create a finish event.
    pub fn finish(finish_reason: FinishReason, usage: Usage) -> Self {
        Self::Finish {
            finish_reason,
            usage,
            provider_metadata: None,
        }
    }

    /// Create an error event.
    pub fn error(error: Value) -> Self {
        Self::Error { error }
    }

    /// The block id of this event, when it belongs to a block.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::TextStart { id }
            | Self::TextDelta { id, .. }
            | Self::TextEnd { id }
            | Self::ReasoningStart { id, .. }
            | Self::ReasoningDelta { id, .. }
            | Self::ReasoningEnd { id }
            | Self::ToolInputStart { id, .. }
            | Self::ToolInputDelta { id, .. }
            | Self::ToolInputEnd { id } => Some(id),
            _ => None,
        }
    }

    /// The delta payload of this event, when it is a delta.
    pub fn delta(&self) -> Option<&str> {
        match self {
            Self::TextDelta { delta, .. }
            | Self::ReasoningDelta { delta, .. }
            | Self::ToolInputDelta { delta, .. } => Some(delta),
            _ => None,
        }
    }

    /// Whether this is the terminal finish event.
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_tags() {
        let part = serde_json::to_value(StreamPart::text_delta("0", "hi")).unwrap();
        assert_eq!(part["type"], "text-delta");
        assert_eq!(part["id"], "0");
        assert_eq!(part["delta"], "hi");

        let finish =
            serde_json::to_value(StreamPart::finish(FinishReason::Stop, Usage::new(3, 1))).unwrap();
        assert_eq!(finish["type"], "finish");
        assert_eq!(finish["finishReason"], "stop");
    }

    #[test]
    fn block_ids() {
        assert_eq!(StreamPart::text_start("a").id(), Some("a"));
        assert_eq!(StreamPart::tool_input_delta("b", "{").id(), Some("b"));
        assert_eq!(
            StreamPart::finish(FinishReason::Stop, Usage::default()).id(),
            None
        );
    }
}
