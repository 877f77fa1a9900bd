//! Text embeddings over `batchEmbedContents` (Generative Language API).

use crate::language_model::GoogleConfig;
use async_trait::async_trait;
use inferkit_provider::{
    EmbeddingCallOptions, EmbeddingModel, EmbeddingResponse, EmbeddingResponseMetadata,
    ProviderError,
};
use inferkit_provider_utils::http::post_json;
use serde::Deserialize;
use serde_json::json;

const MAX_EMBEDDINGS_PER_CALL: usize = 100;

/// Embedding model for the Generative Language API.
pub struct GoogleEmbeddingModel {
    model_id: String,
    config: GoogleConfig,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GoogleEmbeddingModel {
    /// Create an embedding model for the given model id.
    pub fn new(model_id: impl Into<String>, config: GoogleConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }
}

#[async_trait]
impl EmbeddingModel<String> for GoogleEmbeddingModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn max_embeddings_per_call(&self) -> Option<usize> {
        Some(MAX_EMBEDDINGS_PER_CALL)
    }

    fn supports_parallel_calls(&self) -> bool {
        true
    }

    async fn do_embed(
        &self,
        options: EmbeddingCallOptions<String>,
    ) -> Result<EmbeddingResponse, ProviderError> {
        if options.values.len() > MAX_EMBEDDINGS_PER_CALL {
            return Err(ProviderError::TooManyEmbeddingValuesForCall {
                provider: self.config.provider.clone(),
                model_id: self.model_id.clone(),
                max_embeddings_per_call: MAX_EMBEDDINGS_PER_CALL,
                values_count: options.values.len(),
            });
        }

        let requests: Vec<_> = options
            .values
            .iter()
            .map(|value| {
                json!({
                    "model": format!("models/{}", self.model_id),
                    "content": {"parts": [{"text": value}]},
                })
            })
            .collect();
        let body = json!({ "requests": requests });

        let url = (self.config.url)(&self.model_id, "batchEmbedContents");
        let headers = self.config.request_headers(options.headers.as_ref()).await?;

        let response = post_json(
            &self.config.client,
            &url,
            &headers,
            &body,
            None,
            options.abort_signal.as_ref(),
        )
        .await?;

        let parsed: BatchEmbedResponse = serde_json::from_value(response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            })?;

        Ok(EmbeddingResponse {
            embeddings: parsed
                .embeddings
                .into_iter()
                .map(|embedding| embedding.values)
                .collect(),
            usage: None,
            provider_metadata: None,
            response: Some(EmbeddingResponseMetadata {
                id: None,
                model_id: Some(self.model_id.clone()),
                headers: Some(response.headers),
            }),
        })
    }
}
