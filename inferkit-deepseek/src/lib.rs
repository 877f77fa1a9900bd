//! DeepSeek provider for inferkit.
//!
//! DeepSeek speaks the chat-completions protocol; `deepseek-reasoner`
//! additionally returns `reasoning_content`, which the shared chat model
//! already surfaces as reasoning parts. The provider contributes the
//! prompt-cache token counts DeepSeek reports in its usage object.

pub mod metadata_extractor;
pub mod provider;

pub use metadata_extractor::DeepSeekMetadataExtractor;
pub use provider::{DeepSeekProvider, DeepSeekProviderSettings, create_deepseek};
