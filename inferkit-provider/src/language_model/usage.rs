use serde::{Deserialize, Serialize};

/// Token usage for a language model call.
///
/// Adapters populate only the fields their service reports; everything else
/// stays zero, and consumers must tolerate that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Number of input (prompt) tokens.
    #[serde(default)]
    pub input_tokens: u64,

    /// Number of output (completion) tokens.
    #[serde(default)]
    pub output_tokens: u64,

    /// Total tokens as reported by the provider.
    #[serde(default)]
    pub total_tokens: u64,

    /// Number of reasoning tokens.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reasoning_tokens: u64,

    /// Number of cached input tokens.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cached_input_tokens: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl Usage {
    /// Create a usage value from input/output counts; the total is derived.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            reasoning_tokens: 0,
            cached_input_tokens: 0,
        }
    }

    /// The total token count, derived when the provider did not report one.
    pub fn total(&self) -> u64 {
        if self.total_tokens > 0 {
            self.total_tokens
        } else {
            self.input_tokens + self.output_tokens
        }
    }

    /// Sum two usage values field by field.
    pub fn add(&self, other: &Usage) -> Usage {
        Usage {
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
            reasoning_tokens: self.reasoning_tokens + other.reasoning_tokens,
            cached_input_tokens: self.cached_input_tokens + other.cached_input_tokens,
        }
    }
}
