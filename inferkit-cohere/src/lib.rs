//! Cohere provider for inferkit.
//!
//! Cohere's v2 compatibility endpoint speaks the chat-completions
//! protocol, so the shared OpenAI-compatible models serve chat and
//! embeddings directly. Embeddings batch at 96 values per call.

pub mod provider;

pub use provider::{CohereProvider, CohereProviderSettings, create_cohere};
