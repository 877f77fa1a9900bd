use crate::chat::metadata_extractor::MetadataExtractor;
use inferkit_provider::shared::Headers;
use serde_json::Value;
use std::sync::Arc;

/// Header-producing closure, evaluated per request so rotating credentials
/// are picked up.
pub type HeadersFn = Arc<dyn Fn() -> Headers + Send + Sync>;

/// URL builder: maps an API path like `/chat/completions` to a full URL.
pub type UrlFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Request body hook applied after the body has been assembled, for
/// provider quirks that operate on the wire shape itself.
pub type TransformRequestBodyFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Configuration shared by all models of one OpenAI-compatible provider.
#[derive(Clone)]
pub struct OpenAICompatibleConfig {
    /// Provider name used in errors and metadata, e.g. `"deepseek.chat"`.
    /// The segment before the first `.` namespaces provider options.
    pub provider: String,

    /// Produces the headers for each request (authorization included).
    pub headers: HeadersFn,

    /// Builds the full URL for an API path.
    pub url: UrlFn,

    /// Ask for usage accounting on streaming responses
    /// (`stream_options.include_usage`).
    pub include_usage: bool,

    /// Whether the service enforces JSON schemas server-side
    /// (`response_format: {"type": "json_schema"}`).
    pub supports_structured_outputs: bool,

    /// Optional hook harvesting provider-specific response metadata.
    pub metadata_extractor: Option<Arc<dyn MetadataExtractor>>,

    /// Optional hook rewriting the assembled request body.
    pub transform_request_body: Option<TransformRequestBodyFn>,

    /// HTTP client, pooled per provider.
    pub client: reqwest::Client,
}

impl OpenAICompatibleConfig {
    /// Create a configuration for a provider rooted at `base_url`.
    pub fn new(provider: impl Into<String>, base_url: impl Into<String>, headers: HeadersFn) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            provider: provider.into(),
            headers,
            url: Arc::new(move |path| format!("{base_url}{path}")),
            include_usage: true,
            supports_structured_outputs: false,
            metadata_extractor: None,
            transform_request_body: None,
            client: reqwest::Client::new(),
        }
    }

    /// Enable or disable streaming usage accounting.
    pub fn with_include_usage(mut self, include_usage: bool) -> Self {
        self.include_usage = include_usage;
        self
    }

    /// Mark the provider as supporting server-side JSON schemas.
    pub fn with_structured_outputs(mut self, supported: bool) -> Self {
        self.supports_structured_outputs = supported;
        self
    }

    /// Attach a metadata extractor.
    pub fn with_metadata_extractor(mut self, extractor: Arc<dyn MetadataExtractor>) -> Self {
        self.metadata_extractor = Some(extractor);
        self
    }

    /// Attach a request body transformer.
    pub fn with_transform_request_body(mut self, transform: TransformRequestBodyFn) -> Self {
        self.transform_request_body = Some(transform);
        self
    }

    /// The namespace used for provider options and metadata: the segment of
    /// the provider name before the first `.`.
    pub fn provider_options_name(&self) -> &str {
        self.provider
            .split('.')
            .next()
            .unwrap_or(&self.provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn url_builder_joins_paths() {
        let config = OpenAICompatibleConfig::new(
            "test",
            "https://api.test.com/v1/",
            Arc::new(HashMap::new),
        );
        assert_eq!(
            (config.url)("/chat/completions"),
            "https://api.test.com/v1/chat/completions"
        );
    }

    #[test]
    fn provider_options_name_strips_suffix() {
        let config = OpenAICompatibleConfig::new(
            "deepseek.chat",
            "https://api.deepseek.com",
            Arc::new(HashMap::new),
        );
        assert_eq!(config.provider_options_name(), "deepseek");
    }
}
