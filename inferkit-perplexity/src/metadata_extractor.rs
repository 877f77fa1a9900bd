use inferkit_openai_compatible::chat::metadata_extractor::{
    MetadataExtractor, StreamMetadataExtractor,
};
use inferkit_provider::shared::ProviderMetadata;
use serde_json::Value;
use std::collections::HashMap;

/// Surfaces Perplexity's `citations` array under the `perplexity`
/// metadata namespace.
pub struct PerplexityMetadataExtractor;

fn build_metadata(citations: &Value) -> Option<ProviderMetadata> {
    let citations = citations.as_array()?;
    if citations.is_empty() {
        return None;
    }
    let mut inner = HashMap::new();
    inner.insert("citations".to_string(), Value::Array(citations.clone()));
    let mut metadata = HashMap::new();
    metadata.insert("perplexity".to_string(), inner);
    Some(metadata)
}

impl MetadataExtractor for PerplexityMetadataExtractor {
    fn extract_metadata(&self, parsed_body: &Value) -> Option<ProviderMetadata> {
        build_metadata(parsed_body.get("citations")?)
    }

    fn create_stream_extractor(&self) -> Box<dyn StreamMetadataExtractor> {
        Box::new(PerplexityStreamExtractor { citations: None })
    }
}

struct PerplexityStreamExtractor {
    citations: Option<Value>,
}

impl StreamMetadataExtractor for PerplexityStreamExtractor {
    fn process_chunk(&mut self, parsed_chunk: &Value) {
        if let Some(citations) = parsed_chunk.get("citations") {
            if citations.as_array().is_some_and(|array| !array.is_empty()) {
                self.citations = Some(citations.clone());
            }
        }
    }

    fn build_metadata(&self) -> Option<ProviderMetadata> {
        build_metadata(self.citations.as_ref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn captures_citations_from_the_body() {
        let body = json!({"citations": ["https://a.example", "https://b.example"]});
        let metadata = PerplexityMetadataExtractor.extract_metadata(&body).unwrap();
        assert_eq!(
            metadata["perplexity"]["citations"],
            json!(["https://a.example", "https://b.example"])
        );
    }

    #[test]
    fn no_citations_no_metadata() {
        assert!(
            PerplexityMetadataExtractor
                .extract_metadata(&json!({"choices": []}))
                .is_none()
        );
    }
}
