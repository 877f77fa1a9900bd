//! inferkit core
//!
//! The high-level surface of inferkit: validated operations over the model
//! traits (`generate_text`, `stream_text`, `embed`, `embed_many`,
//! `generate_image`, `generate_speech`, `transcribe`), the middleware
//! engine, the provider registry, the schema validation bridge and the MCP
//! tool client.
//!
//! Providers plug in underneath through the traits in `inferkit-provider`;
//! nothing in this crate knows any wire protocol.

pub mod embed;
pub mod generate_image;
pub mod generate_speech;
pub mod generate_text;
pub mod mcp;
pub mod middleware;
pub mod prompt;
pub mod registry;
pub mod schema;
pub mod stream_text;
pub mod transcribe;

pub use embed::{EmbedManyResult, EmbedResult, embed, embed_many};
pub use generate_image::{GenerateImageResult, generate_image};
pub use generate_speech::{GenerateSpeechResult, generate_speech};
pub use generate_text::{GenerateTextResult, generate_text};
pub use middleware::language_model::LanguageModelMiddleware;
pub use middleware::wrap::wrap_language_model;
pub use registry::{ProviderRegistry, create_provider_registry};
pub use stream_text::{StreamTextResult, stream_text};
pub use transcribe::{TranscribeResult, transcribe};
