use crate::error::ProviderError;
use crate::language_model::call_options::CallOptions;
use crate::language_model::call_warning::CallWarning;
use crate::language_model::content::Content;
use crate::language_model::finish_reason::FinishReason;
use crate::language_model::response_metadata::ResponseMetadata;
use crate::language_model::stream_part::StreamPart;
use crate::language_model::usage::Usage;
use crate::shared::{Headers, ProviderMetadata};
use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;

/// Call options for language model requests.
pub mod call_options;
/// Non-fatal warnings attached to responses.
pub mod call_warning;
/// Output content parts.
pub mod content;
/// Binary/URL data payloads used by file and image parts.
pub mod data_content;
/// Finish reasons.
pub mod finish_reason;
/// Prompt messages and message parts.
pub mod prompt;
/// Response metadata echoed by the server.
pub mod response_metadata;
/// Streaming event types.
pub mod stream_part;
/// Tool definitions.
pub mod tool;
/// Tool selection strategies.
pub mod tool_choice;
/// Token usage accounting.
pub mod usage;

/// A language model that can generate and stream text.
///
/// Implementations translate [`CallOptions`] into their service's wire
/// protocol, execute the request, and translate the response back into the
/// canonical content and event types. Adapters never retry; retry policy is
/// a middleware concern layered above the model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Name of the provider, e.g. `"openai"` or `"anthropic"`.
    fn provider(&self) -> &str;

    /// Provider-specific model id, e.g. `"gpt-4o-mini"`.
    fn model_id(&self) -> &str;

    /// Perform a non-streaming generation call.
    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResponse, ProviderError>;

    /// Perform a streaming generation call.
    ///
    /// The returned stream is a single-consumer lazy sequence. Events follow
    /// the block grammar: every delta's id refers to a previously opened and
    /// not yet closed block, and exactly one finish event terminates the
    /// stream. Mid-flight failures surface as an error event before the
    /// stream ends; events already delivered remain valid.
    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError>;
}

impl std::fmt::Debug for dyn LanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageModel")
            .field("provider", &self.provider())
            .field("model_id", &self.model_id())
            .finish()
    }
}

/// Response from a non-streaming generation call.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// Generated content parts, in the order the model produced them.
    pub content: Vec<Content>,

    /// Why generation finished.
    pub finish_reason: FinishReason,

    /// Token usage statistics.
    pub usage: Usage,

    /// Provider-specific metadata, namespaced by provider id.
    pub provider_metadata: Option<ProviderMetadata>,

    /// Echo of the request that was sent.
    pub request: Option<RequestMetadata>,

    /// Server-echoed response metadata.
    pub response: Option<ResponseMetadata>,

    /// Non-fatal warnings from the call.
    pub warnings: Vec<CallWarning>,
}

/// Response from a streaming generation call.
pub struct StreamResponse {
    /// Stream of events.
    pub stream: Box<dyn Stream<Item = StreamPart> + Unpin + Send>,

    /// Echo of the request that was sent.
    pub request: Option<RequestMetadata>,

    /// Metadata available when the stream was opened.
    pub response: Option<StreamResponseMetadata>,
}

/// Echo of the request sent to the provider.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The raw request body.
    pub body: Option<Value>,
}

/// Metadata available when a stream is opened.
#[derive(Debug, Clone, Default)]
pub struct StreamResponseMetadata {
    /// HTTP headers of the streaming response.
    pub headers: Option<Headers>,
}

impl GenerateResponse {
    /// All top-level text parts joined into one string.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                Content::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect()
    }
}
