//! Amazon Bedrock provider for inferkit.
//!
//! Talks to the Bedrock runtime's Converse envelope, which fronts
//! Anthropic, Llama, Titan and other model families behind one wire shape.
//! Requests are signed with AWS SigV4 (or a bearer token where
//! `AWS_BEARER_TOKEN_BEDROCK` is provisioned); Titan embeddings use the
//! `invoke` endpoint with a batch size of one.

pub mod api_types;
pub mod auth;
pub mod convert_messages;
pub mod embedding;
pub mod language_model;
pub mod provider;
pub mod sigv4;

pub use auth::BedrockAuth;
pub use language_model::{BedrockConfig, BedrockLanguageModel};
pub use provider::{BedrockProvider, BedrockProviderSettings, create_bedrock};
