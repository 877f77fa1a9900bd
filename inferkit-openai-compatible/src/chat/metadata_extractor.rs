use inferkit_provider::shared::ProviderMetadata;
use serde_json::Value;

/// Harvests provider-specific metadata from chat-completions responses.
///
/// Providers that report extras beyond the common wire shape (DeepSeek's
/// prompt-cache token counts, Perplexity's citations) implement this to
/// surface them under their namespace in [`ProviderMetadata`].
pub trait MetadataExtractor: Send + Sync {
    /// Extract metadata from a complete, non-streaming response body.
    fn extract_metadata(&self, parsed_body: &Value) -> Option<ProviderMetadata>;

    /// Create a stateful extractor for one streaming response.
    fn create_stream_extractor(&self) -> Box<dyn StreamMetadataExtractor>;
}

/// Accumulates metadata across the chunks of one streaming response.
pub trait StreamMetadataExtractor: Send {
    /// Observe one parsed chunk.
    fn process_chunk(&mut self, parsed_chunk: &Value);

    /// Build the final metadata after the stream ended.
    fn build_metadata(&self) -> Option<ProviderMetadata>;
}
