//! TogetherAI provider for inferkit.
//!
//! Together hosts open-weights models behind the chat-completions
//! protocol, with embeddings and image generation on the matching
//! endpoints; everything rides on the shared OpenAI-compatible models.

pub mod provider;

pub use provider::{TogetherAIProvider, TogetherAIProviderSettings, create_togetherai};
