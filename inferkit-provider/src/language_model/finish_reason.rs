use serde::{Deserialize, Serialize};

/// Why a generation finished.
///
/// This is a closed set; adapters map their provider's reason strings onto
/// it with a fixed table and fall back to [`FinishReason::Other`] for
/// anything they recognise but cannot classify, or
/// [`FinishReason::Unknown`] when no reason was reported at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// The model generated a natural stop (including stop sequences).
    Stop,
    /// The token limit was reached.
    Length,
    /// The provider's content filter intervened.
    ContentFilter,
    /// The model requested tool calls.
    ToolCalls,
    /// Generation failed.
    Error,
    /// A reason was reported that has no canonical equivalent.
    Other,
    /// No reason was reported.
    Unknown,
}
