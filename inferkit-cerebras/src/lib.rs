//! Cerebras provider for inferkit.
//!
//! A plain chat-completions endpoint; everything rides on the shared
//! OpenAI-compatible chat model.

pub mod provider;

pub use provider::{CerebrasProvider, CerebrasProviderSettings, create_cerebras};
