//! Embedding operations with transparent batching.

use futures::future::try_join_all;
use inferkit_provider::{
    EmbeddingCallOptions, EmbeddingModel, EmbeddingUsage, ProviderError,
};
use std::sync::Arc;

/// Result of embedding a single value.
#[derive(Debug, Clone)]
pub struct EmbedResult {
    /// The embedding vector.
    pub embedding: Vec<f32>,
    /// Token usage, when reported.
    pub usage: Option<EmbeddingUsage>,
}

/// Result of embedding many values.
#[derive(Debug, Clone)]
pub struct EmbedManyResult {
    /// One vector per input, in input order.
    pub embeddings: Vec<Vec<f32>>,
    /// Accumulated token usage across all batches.
    pub usage: EmbeddingUsage,
}

/// Embed a single value.
pub async fn embed(
    model: &Arc<dyn EmbeddingModel<String>>,
    value: String,
) -> Result<EmbedResult, ProviderError> {
    let mut response = model.do_embed(EmbeddingCallOptions::new(vec![value])).await?;
    if response.embeddings.is_empty() {
        return Err(ProviderError::NoContentGenerated {
            message: "embedding response was empty".to_string(),
        });
    }
    Ok(EmbedResult {
        embedding: response.embeddings.swap_remove(0),
        usage: response.usage,
    })
}

/// Embed many values, batching transparently.
///
/// Values are split into batches of the model's per-call limit. Batches run
/// concurrently when the model declares parallel calls safe, sequentially
/// otherwise; either way results come back in input order and usage
/// accumulates across batches.
pub async fn embed_many(
    model: &Arc<dyn EmbeddingModel<String>>,
    values: Vec<String>,
) -> Result<EmbedManyResult, ProviderError> {
    if values.is_empty() {
        return Ok(EmbedManyResult {
            embeddings: vec![],
            usage: EmbeddingUsage::default(),
        });
    }

    let batch_size = model.max_embeddings_per_call().unwrap_or(values.len());
    let expected = values.len();

    let batches: Vec<Vec<String>> = values
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect();

    let responses = if model.supports_parallel_calls() {
        try_join_all(
            batches
                .into_iter()
                .map(|batch| model.do_embed(EmbeddingCallOptions::new(batch))),
        )
        .await?
    } else {
        let mut responses = Vec::new();
        for batch in batches {
            responses.push(model.do_embed(EmbeddingCallOptions::new(batch)).await?);
        }
        responses
    };

    let mut embeddings = Vec::with_capacity(expected);
    let mut usage = EmbeddingUsage::default();
    for response in responses {
        embeddings.extend(response.embeddings);
        if let Some(batch_usage) = response.usage {
            usage.tokens += batch_usage.tokens;
        }
    }

    if embeddings.len() != expected {
        return Err(ProviderError::InvalidResponseData {
            message: format!(
                "expected {expected} embeddings, received {}",
                embeddings.len()
            ),
            data: String::new(),
        });
    }

    Ok(EmbedManyResult { embeddings, usage })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inferkit_provider::EmbeddingResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        limit: Option<usize>,
        parallel: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingModel<String> for CountingModel {
        fn provider(&self) -> &str {
            "counting"
        }

        fn model_id(&self) -> &str {
            "count-1"
        }

        fn max_embeddings_per_call(&self) -> Option<usize> {
            self.limit
        }

        fn supports_parallel_calls(&self) -> bool {
            self.parallel
        }

        async fn do_embed(
            &self,
            options: EmbeddingCallOptions<String>,
        ) -> Result<EmbeddingResponse, ProviderError> {
            if let Some(limit) = self.limit {
                if options.values.len() > limit {
                    return Err(ProviderError::TooManyEmbeddingValuesForCall {
                        provider: "counting".into(),
                        model_id: "count-1".into(),
                        max_embeddings_per_call: limit,
                        values_count: options.values.len(),
                    });
                }
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EmbeddingResponse {
                embeddings: options
                    .values
                    .iter()
                    .map(|value| vec![value.len() as f32])
                    .collect(),
                usage: Some(EmbeddingUsage {
                    tokens: options.values.len() as u64,
                }),
                provider_metadata: None,
                response: None,
            })
        }
    }

    fn model(limit: Option<usize>, parallel: bool) -> Arc<dyn EmbeddingModel<String>> {
        Arc::new(CountingModel {
            limit,
            parallel,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn embed_returns_single_vector() {
        let model = model(None, true);
        let result = embed(&model, "hello".into()).await.unwrap();
        assert_eq!(result.embedding, vec![5.0]);
    }

    #[tokio::test]
    async fn embed_many_batches_over_the_limit() {
        let values: Vec<String> = (0..5).map(|i| "x".repeat(i + 1)).collect();

        // A single oversized call fails at the model...
        let model = model(Some(2), false);
        let direct = model
            .do_embed(EmbeddingCallOptions::new(values.clone()))
            .await;
        assert!(matches!(
            direct,
            Err(ProviderError::TooManyEmbeddingValuesForCall { .. })
        ));

        // ...while embed_many succeeds by batching, preserving order and
        // accumulating usage.
        let result = embed_many(&model, values).await.unwrap();
        assert_eq!(
            result.embeddings,
            vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]]
        );
        assert_eq!(result.usage.tokens, 5);
    }

    #[tokio::test]
    async fn embed_many_parallel_preserves_order() {
        let model = model(Some(1), true);
        let values: Vec<String> = (0..4).map(|i| "y".repeat(i + 1)).collect();
        let result = embed_many(&model, values).await.unwrap();
        assert_eq!(
            result.embeddings,
            vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]]
        );
    }

    #[tokio::test]
    async fn embed_many_of_nothing_is_empty() {
        let model = model(Some(2), true);
        let result = embed_many(&model, vec![]).await.unwrap();
        assert!(result.embeddings.is_empty());
        assert_eq!(result.usage.tokens, 0);
    }
}
