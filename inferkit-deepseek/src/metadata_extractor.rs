use inferkit_openai_compatible::chat::metadata_extractor::{
    MetadataExtractor, StreamMetadataExtractor,
};
use inferkit_provider::shared::ProviderMetadata;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Surfaces DeepSeek's prompt-cache hit/miss token counts under the
/// `deepseek` metadata namespace.
pub struct DeepSeekMetadataExtractor;

fn build_metadata(usage: &Value) -> Option<ProviderMetadata> {
    let hit = usage.get("prompt_cache_hit_tokens").and_then(Value::as_u64);
    let miss = usage.get("prompt_cache_miss_tokens").and_then(Value::as_u64);
    if hit.is_none() && miss.is_none() {
        return None;
    }

    let mut inner = HashMap::new();
    if let Some(hit) = hit {
        inner.insert("promptCacheHitTokens".to_string(), json!(hit));
    }
    if let Some(miss) = miss {
        inner.insert("promptCacheMissTokens".to_string(), json!(miss));
    }
    let mut metadata = HashMap::new();
    metadata.insert("deepseek".to_string(), inner);
    Some(metadata)
}

impl MetadataExtractor for DeepSeekMetadataExtractor {
    fn extract_metadata(&self, parsed_body: &Value) -> Option<ProviderMetadata> {
        build_metadata(parsed_body.get("usage")?)
    }

    fn create_stream_extractor(&self) -> Box<dyn StreamMetadataExtractor> {
        Box::new(DeepSeekStreamExtractor { usage: None })
    }
}

struct DeepSeekStreamExtractor {
    usage: Option<Value>,
}

impl StreamMetadataExtractor for DeepSeekStreamExtractor {
    fn process_chunk(&mut self, parsed_chunk: &Value) {
        // Usage arrives on the trailing chunk; keep the latest seen.
        if let Some(usage) = parsed_chunk.get("usage") {
            if !usage.is_null() {
                self.usage = Some(usage.clone());
            }
        }
    }

    fn build_metadata(&self) -> Option<ProviderMetadata> {
        build_metadata(self.usage.as_ref()?)
    }
}
