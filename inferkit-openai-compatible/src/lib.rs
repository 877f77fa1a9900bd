//! OpenAI-compatible provider implementation.
//!
//! Many services expose the chat-completions wire shape: OpenAI itself,
//! Groq, DeepSeek, DeepInfra, Cerebras, Perplexity, Mistral, TogetherAI,
//! xAI, Cohere's compatibility endpoint, and others. This crate implements
//! that shape once — chat with streaming and tool calling, embeddings, and
//! image generation — parameterised by a [`OpenAICompatibleConfig`] so each
//! provider crate only supplies its base URL, credentials and quirks.

pub mod chat;
pub mod embedding;
pub mod image;
pub mod provider;
pub mod settings;
pub mod speech;
pub mod transcription;

pub use chat::ChatLanguageModel;
pub use chat::metadata_extractor::{MetadataExtractor, StreamMetadataExtractor};
pub use embedding::OpenAICompatibleEmbeddingModel;
pub use image::OpenAICompatibleImageModel;
pub use provider::{OpenAICompatibleProvider, OpenAICompatibleProviderSettings};
pub use settings::OpenAICompatibleConfig;
pub use speech::OpenAICompatibleSpeechModel;
pub use transcription::OpenAICompatibleTranscriptionModel;
