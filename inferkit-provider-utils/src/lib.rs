//! Shared utilities for inferkit providers.
//!
//! Everything an adapter needs besides its wire format lives here: the HTTP
//! transport (pooled client, JSON and streaming requests, error
//! classification, credential redaction), SSE and newline-delimited JSON
//! decoding, api-key loading, provider-options parsing and id generation.
//!
//! Retries are deliberately absent from this layer. The transport records
//! whether a failure is retryable on the error value; acting on that is the
//! retry middleware's job.

pub mod api_key;
pub mod http;
pub mod id;
pub mod provider_options;
pub mod sse;

pub use api_key::{load_api_key, load_optional_setting};
pub use http::{
    JsonResponse, StreamedResponse, get_bytes, get_json, post_bytes, post_json, post_stream,
};
pub use id::generate_id;
pub use provider_options::parse_provider_options;
pub use sse::{SseEvent, json_lines, lines, sse_events};
