use serde::{Deserialize, Serialize};

/// Provider options under the `anthropic` namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnthropicOptions {
    /// Extended thinking configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<AnthropicThinking>,
}

/// Extended thinking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicThinking {
    /// Token budget for thinking.
    pub budget_tokens: u32,
}
