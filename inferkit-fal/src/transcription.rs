//! Queue-based transcription.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    ProviderError, TranscriptSegment, TranscriptionCallOptions, TranscriptionModel,
    TranscriptionResponse, TranscriptionResponseMetadata,
};
use inferkit_provider_utils::http::{get_json, post_json, redact_url};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared queue configuration.
#[derive(Clone)]
pub struct FalTranscriptionConfig {
    pub provider: String,
    /// Queue base URL, e.g. `https://queue.fal.run`.
    pub queue_url: String,
    pub headers: Arc<dyn Fn() -> Headers + Send + Sync>,
    pub client: reqwest::Client,
    /// Interval between status polls.
    pub poll_interval: Duration,
    /// Overall job deadline.
    pub poll_timeout: Duration,
}

/// A FAL transcription model (`fal-ai/whisper` and friends).
pub struct FalTranscriptionModel {
    model_id: String,
    config: FalTranscriptionConfig,
}

#[derive(Debug, Deserialize)]
struct QueueSubmitResponse {
    request_id: Option<String>,
    status_url: String,
    response_url: String,
}

#[derive(Debug, Deserialize)]
struct QueueStatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    text: String,
    #[serde(default)]
    chunks: Vec<WhisperChunk>,
    #[serde(default)]
    inferred_languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WhisperChunk {
    #[serde(default)]
    text: String,
    /// `[start, end]` in seconds; either bound may be null.
    #[serde(default)]
    timestamp: Vec<Option<f64>>,
}

impl FalTranscriptionModel {
    /// Create a transcription model for the given FAL model id.
    pub fn new(model_id: impl Into<String>, config: FalTranscriptionConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }

    async fn wait_for_completion(
        &self,
        status_url: &str,
        options: &TranscriptionCallOptions,
    ) -> Result<(), ProviderError> {
        let deadline = Instant::now() + self.config.poll_timeout;
        let headers = (self.config.headers)();

        loop {
            if Instant::now() >= deadline {
                return Err(ProviderError::transport(
                    format!(
                        "transcription did not complete within {:?}",
                        self.config.poll_timeout
                    ),
                    redact_url(status_url),
                ));
            }

            let response = get_json(
                &self.config.client,
                status_url,
                &headers,
                None,
                options.abort_signal.as_ref(),
            )
            .await?;
            let status: QueueStatusResponse = serde_json::from_value(response.body.clone())
                .map_err(|err| ProviderError::InvalidResponseData {
                    message: err.to_string(),
                    data: response.body.to_string(),
                })?;

            match status.status.as_str() {
                "COMPLETED" => return Ok(()),
                "FAILED" | "ERROR" => {
                    return Err(ProviderError::api_call(
                        "queued transcription failed",
                        redact_url(status_url),
                        response.status,
                        None,
                        Some(response.body.to_string()),
                    ));
                }
                _ => tokio::time::sleep(self.config.poll_interval).await,
            }
        }
    }
}

#[async_trait]
impl TranscriptionModel for FalTranscriptionModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_transcribe(
        &self,
        options: TranscriptionCallOptions,
    ) -> Result<TranscriptionResponse, ProviderError> {
        // The queue accepts data URIs, which saves a separate upload step.
        let audio_url = format!(
            "data:{};base64,{}",
            options.media_type,
            STANDARD.encode(&options.audio)
        );
        let body = json!({"audio_url": audio_url});

        let submit_url = format!(
            "{}/{}",
            self.config.queue_url.trim_end_matches('/'),
            self.model_id
        );
        let headers = (self.config.headers)();

        let submit_response = post_json(
            &self.config.client,
            &submit_url,
            &headers,
            &body,
            None,
            options.abort_signal.as_ref(),
        )
        .await?;
        let submitted: QueueSubmitResponse = serde_json::from_value(submit_response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: submit_response.body.to_string(),
            })?;

        self.wait_for_completion(&submitted.status_url, &options)
            .await?;

        let result = get_json(
            &self.config.client,
            &submitted.response_url,
            &headers,
            None,
            options.abort_signal.as_ref(),
        )
        .await?;
        let output: WhisperOutput = serde_json::from_value(result.body.clone()).map_err(|err| {
            ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: result.body.to_string(),
            }
        })?;

        Ok(TranscriptionResponse {
            text: output.text,
            segments: output
                .chunks
                .into_iter()
                .map(|chunk| {
                    let start = chunk.timestamp.first().copied().flatten().unwrap_or(0.0);
                    let end = chunk.timestamp.get(1).copied().flatten().unwrap_or(start);
                    TranscriptSegment {
                        text: chunk.text,
                        start_seconds: start,
                        end_seconds: end,
                    }
                })
                .collect(),
            language: output.inferred_languages.first().cloned(),
            duration_seconds: None,
            warnings: vec![],
            provider_metadata: submitted.request_id.map(|id| {
                let mut inner = std::collections::HashMap::new();
                inner.insert("requestId".to_string(), json!(id));
                let mut metadata = std::collections::HashMap::new();
                metadata.insert("fal".to_string(), inner);
                metadata
            }),
            response: Some(TranscriptionResponseMetadata {
                model_id: Some(self.model_id.clone()),
                headers: None,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whisper_output_parses_chunks() {
        let body = r#"{
            "text": "hello world",
            "chunks": [
                {"text": "hello", "timestamp": [0.0, 0.8]},
                {"text": " world", "timestamp": [0.8, null]}
            ],
            "inferred_languages": ["en"]
        }"#;
        let output: WhisperOutput = serde_json::from_str(body).unwrap();
        assert_eq!(output.text, "hello world");
        assert_eq!(output.chunks.len(), 2);
        assert_eq!(output.chunks[1].timestamp[1], None);
    }
}
