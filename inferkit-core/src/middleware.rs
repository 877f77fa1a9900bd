//! Middleware composition for language models.
//!
//! A middleware is a record of optional interceptors; wrapping a model
//! applies a chain of them to produce a new model with the same operation
//! surface. Parameter transformation runs in forward order, call wrapping
//! composes in reverse order so the first middleware in the chain is the
//! outermost layer of the onion.

pub mod builtin;
pub mod language_model;
pub mod wrap;

pub use builtin::caching::{CacheStore, InMemoryCacheStore, caching_middleware, caching_middleware_with_store};
pub use builtin::default_settings::{DefaultSettings, default_settings_middleware};
pub use builtin::extract_reasoning::extract_reasoning_middleware;
pub use builtin::logging::logging_middleware;
pub use builtin::retry::{RetryOptions, retry_middleware};
pub use builtin::simulate_streaming::simulate_streaming_middleware;
pub use builtin::telemetry::{TelemetryRecord, TelemetrySink, telemetry_middleware};
pub use language_model::{
    DoGenerate, DoStream, LanguageModelMiddleware, ModelInfo, OperationType,
};
pub use wrap::wrap_language_model;
