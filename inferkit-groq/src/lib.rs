//! Groq provider for inferkit.
//!
//! Groq exposes the chat-completions protocol at an OpenAI-style path and
//! additionally hosts whisper transcription and speech synthesis, all of
//! which ride on the shared OpenAI-compatible models.

pub mod provider;

pub use provider::{GroqProvider, GroqProviderSettings, create_groq};
