use crate::error::ProviderError;
use crate::shared::{Headers, ProviderMetadata, ProviderOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// An embedding model converting values into vectors.
///
/// The type parameter is the embeddable value; in practice `String` for
/// text embeddings. A single `do_embed` call is limited to
/// [`max_embeddings_per_call`](EmbeddingModel::max_embeddings_per_call)
/// values; the high-level `embed_many` operation performs batching above
/// that limit.
#[async_trait]
pub trait EmbeddingModel<V>: Send + Sync
where
    V: Send + Sync,
{
    /// Name of the provider.
    fn provider(&self) -> &str;

    /// Provider-specific model id.
    fn model_id(&self) -> &str;

    /// Maximum number of values accepted per call, or `None` for no limit.
    fn max_embeddings_per_call(&self) -> Option<usize>;

    /// Whether batches may be dispatched concurrently.
    fn supports_parallel_calls(&self) -> bool;

    /// Embed the given values, returning vectors in input order.
    async fn do_embed(
        &self,
        options: EmbeddingCallOptions<V>,
    ) -> Result<EmbeddingResponse, ProviderError>;
}

/// Options for an embedding call.
#[derive(Debug, Clone)]
pub struct EmbeddingCallOptions<V> {
    /// The values to embed.
    pub values: Vec<V>,

    /// Additional HTTP headers for this request.
    pub headers: Option<Headers>,

    /// Provider-specific options.
    pub provider_options: Option<ProviderOptions>,

    /// Cancellation signal.
    pub abort_signal: Option<CancellationToken>,
}

impl<V> EmbeddingCallOptions<V> {
    /// Create options for the given values.
    pub fn new(values: Vec<V>) -> Self {
        Self {
            values,
            headers: None,
            provider_options: None,
            abort_signal: None,
        }
    }
}

/// Response from an embedding call.
#[derive(Debug, Clone)]
pub struct EmbeddingResponse {
    /// One vector per input value, in input order.
    pub embeddings: Vec<Vec<f32>>,

    /// Token usage, when the provider reports it.
    pub usage: Option<EmbeddingUsage>,

    /// Provider-specific metadata.
    pub provider_metadata: Option<ProviderMetadata>,

    /// Response metadata.
    pub response: Option<EmbeddingResponseMetadata>,
}

/// Token usage for an embedding call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    /// Number of input tokens consumed.
    pub tokens: u64,
}

/// Metadata echoed with an embedding response.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingResponseMetadata {
    /// Server-assigned response id.
    pub id: Option<String>,

    /// The model id the server actually used.
    pub model_id: Option<String>,

    /// Response headers.
    pub headers: Option<Headers>,
}
