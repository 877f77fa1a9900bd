//! Embeddings over the `/embeddings` endpoint.

use crate::settings::OpenAICompatibleConfig;
use async_trait::async_trait;
use inferkit_provider::{
    EmbeddingCallOptions, EmbeddingModel, EmbeddingResponse, EmbeddingResponseMetadata,
    EmbeddingUsage, ProviderError,
};
use inferkit_provider_utils::http::post_json;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

/// An embedding model for OpenAI-compatible services.
///
/// The per-call batch limit differs per provider (32 for Mistral, 96 for
/// Cohere and DeepInfra, none for OpenAI itself) and is set by the provider
/// crate constructing the model.
pub struct OpenAICompatibleEmbeddingModel {
    model_id: String,
    config: OpenAICompatibleConfig,
    max_embeddings_per_call: Option<usize>,
    supports_parallel_calls: bool,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponseBody {
    data: Vec<EmbeddingDatum>,
    model: Option<String>,
    usage: Option<EmbeddingsUsageBody>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsUsageBody {
    prompt_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

impl OpenAICompatibleEmbeddingModel {
    /// Create an embedding model with no batch limit and parallel batching.
    pub fn new(model_id: impl Into<String>, config: OpenAICompatibleConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
            max_embeddings_per_call: None,
            supports_parallel_calls: true,
        }
    }

    /// Limit how many values one call may embed.
    pub fn with_max_embeddings_per_call(mut self, limit: usize) -> Self {
        self.max_embeddings_per_call = Some(limit);
        self
    }

    /// Declare whether batches may be dispatched concurrently.
    pub fn with_parallel_calls(mut self, supported: bool) -> Self {
        self.supports_parallel_calls = supported;
        self
    }
}

#[async_trait]
impl EmbeddingModel<String> for OpenAICompatibleEmbeddingModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn max_embeddings_per_call(&self) -> Option<usize> {
        self.max_embeddings_per_call
    }

    fn supports_parallel_calls(&self) -> bool {
        self.supports_parallel_calls
    }

    async fn do_embed(
        &self,
        options: EmbeddingCallOptions<String>,
    ) -> Result<EmbeddingResponse, ProviderError> {
        if let Some(limit) = self.max_embeddings_per_call {
            if options.values.len() > limit {
                return Err(ProviderError::TooManyEmbeddingValuesForCall {
                    provider: self.config.provider.clone(),
                    model_id: self.model_id.clone(),
                    max_embeddings_per_call: limit,
                    values_count: options.values.len(),
                });
            }
        }

        let body = json!({
            "model": self.model_id,
            "input": options.values,
            "encoding_format": "float",
        });

        let url = (self.config.url)("/embeddings");
        let mut headers: HashMap<String, String> = (self.config.headers)();
        if let Some(extra) = &options.headers {
            headers.extend(extra.clone());
        }

        let response = post_json(
            &self.config.client,
            &url,
            &headers,
            &body,
            None,
            options.abort_signal.as_ref(),
        )
        .await?;

        let parsed: EmbeddingsResponseBody = serde_json::from_value(response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            })?;

        Ok(EmbeddingResponse {
            embeddings: parsed.data.into_iter().map(|datum| datum.embedding).collect(),
            usage: parsed.usage.map(|usage| EmbeddingUsage {
                tokens: usage.prompt_tokens.or(usage.total_tokens).unwrap_or(0),
            }),
            provider_metadata: None,
            response: Some(EmbeddingResponseMetadata {
                id: None,
                model_id: parsed.model,
                headers: Some(response.headers),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn model(limit: Option<usize>) -> OpenAICompatibleEmbeddingModel {
        let config = OpenAICompatibleConfig::new(
            "test-provider",
            "https://api.test.com/v1",
            Arc::new(HashMap::new),
        );
        let model = OpenAICompatibleEmbeddingModel::new("embed-model", config);
        match limit {
            Some(limit) => model.with_max_embeddings_per_call(limit),
            None => model,
        }
    }

    #[tokio::test]
    async fn rejects_batches_over_the_limit() {
        let model = model(Some(2));
        let err = model
            .do_embed(EmbeddingCallOptions::new(vec![
                "a".into(),
                "b".into(),
                "c".into(),
            ]))
            .await
            .unwrap_err();
        match err {
            ProviderError::TooManyEmbeddingValuesForCall {
                max_embeddings_per_call,
                values_count,
                ..
            } => {
                assert_eq!(max_embeddings_per_call, 2);
                assert_eq!(values_count, 3);
            }
            other => panic!("expected TooManyEmbeddingValuesForCall, got {other:?}"),
        }
    }

    #[test]
    fn batch_limit_is_reported() {
        assert_eq!(model(Some(96)).max_embeddings_per_call(), Some(96));
        assert_eq!(model(None).max_embeddings_per_call(), None);
    }
}
