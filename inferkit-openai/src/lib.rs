//! OpenAI provider for inferkit.
//!
//! Chat and embeddings ride on the OpenAI-compatible implementation with a
//! request transform handling the reasoning-model family's parameter
//! rules; speech synthesis and transcription are OpenAI-specific
//! endpoints implemented here.

pub mod provider;
pub mod reasoning;

pub use provider::{OpenAIProvider, OpenAIProviderSettings, create_openai};
pub use reasoning::{is_reasoning_model, system_message_mode};
