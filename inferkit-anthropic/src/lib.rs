//! Anthropic provider for inferkit.
//!
//! Implements the Messages API: the system instruction rides as a
//! top-level field, conversation turns alternate user/assistant with
//! content blocks, tool results travel inside user messages, and streaming
//! uses typed SSE events keyed by a server-assigned block index.

pub mod api_types;
pub mod convert_messages;
pub mod language_model;
pub mod map_stop_reason;
pub mod options;
pub mod provider;

pub use language_model::{AnthropicConfig, AnthropicMessagesLanguageModel};
pub use provider::{AnthropicProvider, AnthropicProviderSettings, create_anthropic};
