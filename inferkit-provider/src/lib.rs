//! inferkit provider contract
//!
//! This crate defines the interface that every inferkit provider implements:
//! a shared data model for prompts, content, usage and streaming events, the
//! model traits for text generation, embeddings, images, speech and
//! transcription, and the error taxonomy that all operations report through.
//!
//! # Core traits
//!
//! - [`Provider`]: factory producing typed model instances for one backend
//! - [`LanguageModel`]: text generation and streaming
//! - [`EmbeddingModel`]: vector embeddings
//! - [`ImageModel`]: image generation
//! - [`SpeechModel`]: speech synthesis
//! - [`TranscriptionModel`]: audio transcription
//!
//! Provider implementations translate between this crate's canonical types
//! and their service's wire protocol. The high-level operations in
//! `inferkit-core` only ever speak these types, which is what makes models
//! from different services interchangeable behind a registry.

#![warn(missing_docs)]

/// Embedding model trait and response types.
pub mod embedding_model;
/// Error taxonomy for provider operations.
pub mod error;
/// Image generation model trait and response types.
pub mod image_model;
/// Language model trait, data model and streaming events.
pub mod language_model;
/// Provider factory trait.
pub mod provider;
/// Types shared across model kinds.
pub mod shared;
/// Speech synthesis model trait and response types.
pub mod speech_model;
/// Audio transcription model trait and response types.
pub mod transcription_model;

pub use embedding_model::{
    EmbeddingCallOptions, EmbeddingModel, EmbeddingResponse, EmbeddingResponseMetadata,
    EmbeddingUsage,
};
pub use error::ProviderError;
pub use image_model::{ImageCallOptions, ImageModel, ImageResponse, ImageResponseMetadata};
pub use language_model::{
    GenerateResponse, LanguageModel, RequestMetadata, StreamResponse, StreamResponseMetadata,
};
pub use provider::Provider;
pub use speech_model::{SpeechCallOptions, SpeechModel, SpeechResponse, SpeechResponseMetadata};
pub use transcription_model::{
    TranscriptSegment, TranscriptionCallOptions, TranscriptionModel, TranscriptionResponse,
    TranscriptionResponseMetadata,
};
