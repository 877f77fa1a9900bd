//! Google provider for inferkit.
//!
//! One adapter serves two hostings of the same GenerateContent protocol:
//! the Generative Language API (`generativelanguage.googleapis.com`,
//! api-key auth) and Vertex AI (regional `aiplatform.googleapis.com`
//! endpoints with project/location paths and OAuth bearer tokens).
//! Streaming is line-delimited JSON rather than SSE.

pub mod api_types;
pub mod convert_messages;
pub mod embedding;
pub mod language_model;
pub mod options;
pub mod provider;
pub mod vertex;

pub use language_model::{GoogleAuth, GoogleConfig, GoogleLanguageModel};
pub use provider::{GoogleProvider, GoogleProviderSettings, create_google};
pub use vertex::{GoogleVertexProvider, GoogleVertexSettings, TokenProvider, create_vertex};
