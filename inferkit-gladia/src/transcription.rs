//! The upload → init → poll transcription flow.

use crate::options::GladiaOptions;
use async_trait::async_trait;
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    ProviderError, TranscriptSegment, TranscriptionCallOptions, TranscriptionModel,
    TranscriptionResponse, TranscriptionResponseMetadata,
};
use inferkit_provider_utils::http::{extract_error_message, get_json, post_json, redact_url};
use inferkit_provider_utils::provider_options::parse_provider_options;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::{Duration, Instant};

/// Shared polling configuration.
#[derive(Clone)]
pub struct GladiaTranscriptionConfig {
    pub provider: String,
    pub base_url: String,
    pub headers: std::sync::Arc<dyn Fn() -> Headers + Send + Sync>,
    pub client: reqwest::Client,
    /// Interval between result polls.
    pub poll_interval: Duration,
    /// Overall deadline for a transcription job.
    pub poll_timeout: Duration,
}

/// The Gladia transcription model.
pub struct GladiaTranscriptionModel {
    config: GladiaTranscriptionConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    audio_url: String,
}

#[derive(Debug, Deserialize)]
struct InitResponse {
    id: Option<String>,
    result_url: String,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    status: String,
    #[serde(default)]
    error_code: Option<Value>,
    #[serde(default)]
    result: Option<JobResult>,
}

#[derive(Debug, Deserialize)]
struct JobResult {
    #[serde(default)]
    transcription: Option<Transcription>,
    #[serde(default)]
    metadata: Option<JobMetadata>,
}

#[derive(Debug, Deserialize)]
struct Transcription {
    #[serde(default)]
    full_transcript: String,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    utterances: Vec<Utterance>,
}

#[derive(Debug, Deserialize)]
struct Utterance {
    #[serde(default)]
    text: String,
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
}

#[derive(Debug, Deserialize)]
struct JobMetadata {
    #[serde(default)]
    audio_duration: Option<f64>,
}

impl GladiaTranscriptionModel {
    /// Create a transcription model.
    pub fn new(config: GladiaTranscriptionConfig) -> Self {
        Self { config }
    }

    async fn upload(
        &self,
        options: &TranscriptionCallOptions,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/v2/upload", self.config.base_url.trim_end_matches('/'));

        let part = reqwest::multipart::Part::bytes(options.audio.clone())
            .file_name("audio")
            .mime_str(&options.media_type)
            .map_err(|err| ProviderError::invalid_argument("media_type", err.to_string()))?;
        let form = reqwest::multipart::Form::new().part("audio", part);

        let mut request = self.config.client.post(&url).multipart(form);
        for (key, value) in (self.config.headers)() {
            if key.eq_ignore_ascii_case("content-type") {
                continue;
            }
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ProviderError::transport(err.to_string(), redact_url(&url)))?;
        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|err| ProviderError::transport(err.to_string(), redact_url(&url)))?;

        if !status.is_success() {
            let message = match extract_error_message(&body_text) {
                Some(provider_message) => format!("HTTP {status}: {provider_message}"),
                None => format!("HTTP {status}"),
            };
            return Err(ProviderError::api_call(
                message,
                redact_url(&url),
                status.as_u16(),
                None,
                Some(body_text),
            ));
        }

        let upload: UploadResponse = serde_json::from_str(&body_text)
            .map_err(|err| ProviderError::json_parse(&body_text, err))?;
        Ok(upload.audio_url)
    }

    fn job_body(&self, audio_url: String, options: Option<GladiaOptions>) -> Value {
        let mut body = json!({"audio_url": audio_url});
        let Some(options) = options else { return body };

        let extra = options.extra.clone();
        if let Ok(Value::Object(fields)) = serde_json::to_value(&options) {
            for (key, value) in fields {
                if key != "extra" {
                    body[key] = value;
                }
            }
        }
        if let Some(extra) = extra {
            for (key, value) in extra {
                body[key] = value;
            }
        }
        body
    }

    async fn poll(
        &self,
        result_url: &str,
        options: &TranscriptionCallOptions,
    ) -> Result<PollResponse, ProviderError> {
        let deadline = Instant::now() + self.config.poll_timeout;
        let headers = (self.config.headers)();

        loop {
            if Instant::now() >= deadline {
                return Err(ProviderError::transport(
                    format!(
                        "transcription did not complete within {:?}",
                        self.config.poll_timeout
                    ),
                    redact_url(result_url),
                ));
            }
            if let Some(signal) = &options.abort_signal {
                if signal.is_cancelled() {
                    return Err(ProviderError::cancelled("transcribe"));
                }
            }

            let response = get_json(
                &self.config.client,
                result_url,
                &headers,
                None,
                options.abort_signal.as_ref(),
            )
            .await?;

            let poll: PollResponse = serde_json::from_value(response.body.clone())
                .map_err(|err| ProviderError::InvalidResponseData {
                    message: err.to_string(),
                    data: response.body.to_string(),
                })?;

            match poll.status.as_str() {
                "done" => return Ok(poll),
                "error" => {
                    return Err(ProviderError::api_call(
                        format!(
                            "transcription failed: {}",
                            poll.error_code
                                .map(|code| code.to_string())
                                .unwrap_or_else(|| "unknown error".to_string())
                        ),
                        redact_url(result_url),
                        response.status,
                        None,
                        None,
                    ));
                }
                _ => tokio::time::sleep(self.config.poll_interval).await,
            }
        }
    }
}

#[async_trait]
impl TranscriptionModel for GladiaTranscriptionModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        "pre-recorded"
    }

    async fn do_transcribe(
        &self,
        options: TranscriptionCallOptions,
    ) -> Result<TranscriptionResponse, ProviderError> {
        let gladia_options: Option<GladiaOptions> =
            parse_provider_options(options.provider_options.as_ref(), "gladia")?;

        // Step one: push the bytes to the ingest endpoint.
        let audio_url = self.upload(&options).await?;

        // Step two: create the transcription job.
        let init_url = format!(
            "{}/v2/pre-recorded",
            self.config.base_url.trim_end_matches('/')
        );
        let body = self.job_body(audio_url, gladia_options);
        let headers = (self.config.headers)();
        let init_response = post_json(
            &self.config.client,
            &init_url,
            &headers,
            &body,
            None,
            options.abort_signal.as_ref(),
        )
        .await?;
        let init: InitResponse = serde_json::from_value(init_response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: init_response.body.to_string(),
            })?;

        // Step three: poll the result URL until done or deadline.
        let poll = self.poll(&init.result_url, &options).await?;

        let transcription = poll
            .result
            .as_ref()
            .and_then(|result| result.transcription.as_ref())
            .ok_or_else(|| ProviderError::NoContentGenerated {
                message: "transcription result carried no transcript".to_string(),
            })?;

        Ok(TranscriptionResponse {
            text: transcription.full_transcript.clone(),
            segments: transcription
                .utterances
                .iter()
                .map(|utterance| TranscriptSegment {
                    text: utterance.text.clone(),
                    start_seconds: utterance.start,
                    end_seconds: utterance.end,
                })
                .collect(),
            language: transcription.languages.first().cloned(),
            duration_seconds: poll
                .result
                .as_ref()
                .and_then(|result| result.metadata.as_ref())
                .and_then(|metadata| metadata.audio_duration),
            warnings: vec![],
            provider_metadata: init.id.map(|id| {
                let mut inner = std::collections::HashMap::new();
                inner.insert("jobId".to_string(), json!(id));
                let mut metadata = std::collections::HashMap::new();
                metadata.insert("gladia".to_string(), inner);
                metadata
            }),
            response: Some(TranscriptionResponseMetadata {
                model_id: Some("pre-recorded".to_string()),
                headers: None,
            }),
        })
    }
}
