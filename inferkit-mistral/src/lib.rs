//! Mistral provider for inferkit.
//!
//! Mistral's chat endpoint is OpenAI-compatible and accepts two extra
//! knobs: `safe_prompt` (safety prompt injection) and
//! `document_image_limit` (multimodal caps), both flowing through provider
//! options. Embeddings are limited to 32 values per call.

pub mod options;
pub mod provider;

pub use options::MistralOptions;
pub use provider::{MistralProvider, MistralProviderSettings, create_mistral};
