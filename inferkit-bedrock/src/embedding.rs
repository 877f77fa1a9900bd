//! Titan text embeddings over the `invoke` endpoint.
//!
//! Titan embeds one value per call; `embed_many` in the core batches above
//! the model with a batch size of one.

use crate::language_model::BedrockConfig;
use async_trait::async_trait;
use inferkit_provider::{
    EmbeddingCallOptions, EmbeddingModel, EmbeddingResponse, EmbeddingResponseMetadata,
    EmbeddingUsage, ProviderError,
};
use inferkit_provider_utils::http::post_json;
use serde::Deserialize;
use serde_json::json;

/// Titan embedding model.
pub struct BedrockEmbeddingModel {
    model_id: String,
    config: BedrockConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanEmbeddingResponse {
    embedding: Vec<f32>,
    #[serde(default)]
    input_text_token_count: Option<u64>,
}

impl BedrockEmbeddingModel {
    /// Create an embedding model for the given Titan model id.
    pub fn new(model_id: impl Into<String>, config: BedrockConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }
}

#[async_trait]
impl EmbeddingModel<String> for BedrockEmbeddingModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn max_embeddings_per_call(&self) -> Option<usize> {
        Some(1)
    }

    fn supports_parallel_calls(&self) -> bool {
        true
    }

    async fn do_embed(
        &self,
        options: EmbeddingCallOptions<String>,
    ) -> Result<EmbeddingResponse, ProviderError> {
        if options.values.len() > 1 {
            return Err(ProviderError::TooManyEmbeddingValuesForCall {
                provider: self.config.provider.clone(),
                model_id: self.model_id.clone(),
                max_embeddings_per_call: 1,
                values_count: options.values.len(),
            });
        }
        let value = options
            .values
            .first()
            .ok_or_else(|| ProviderError::invalid_argument("values", "no value to embed"))?;

        let body = json!({"inputText": value});
        let url = format!(
            "{}/model/{}/invoke",
            self.config.base_url.trim_end_matches('/'),
            self.model_id
        );

        let body_bytes =
            serde_json::to_vec(&body).map_err(|err| ProviderError::model_error(err.to_string()))?;
        let mut headers = self.config.auth.headers("POST", &url, &body_bytes)?;
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

        let parsed: TitanEmbeddingResponse = serde_json::from_value(response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            })?;

        Ok(EmbeddingResponse {
            embeddings: vec![parsed.embedding],
            usage: parsed
                .input_text_token_count
                .map(|tokens| EmbeddingUsage { tokens }),
            provider_metadata: None,
            response: Some(EmbeddingResponseMetadata {
                id: None,
                model_id: Some(self.model_id.clone()),
                headers: Some(response.headers),
            }),
        })
    }
}
