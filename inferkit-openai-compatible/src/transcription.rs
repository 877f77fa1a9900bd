//! Transcription over `/audio/transcriptions` (multipart upload).

use async_trait::async_trait;
use crate::settings::OpenAICompatibleConfig;
use inferkit_provider::{
    ProviderError, TranscriptSegment, TranscriptionCallOptions, TranscriptionModel,
    TranscriptionResponse, TranscriptionResponseMetadata,
};
use inferkit_provider_utils::http::{extract_error_message, redact_url};
use serde::Deserialize;

/// File extension for an audio MIME type, used to name the upload part.
fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/flac" => "flac",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/m4a" => "m4a",
        "audio/webm" => "webm",
        _ => "bin",
    }
}

/// A whisper-style transcription model, served by OpenAI, Groq and other
/// compatible endpoints.
pub struct OpenAICompatibleTranscriptionModel {
    model_id: String,
    config: OpenAICompatibleConfig,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponseBody {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Vec<SegmentBody>,
}

#[derive(Debug, Deserialize)]
struct SegmentBody {
    text: String,
    start: f64,
    end: f64,
}

impl OpenAICompatibleTranscriptionModel {
    /// Create a transcription model for the given model id.
    pub fn new(model_id: impl Into<String>, config: OpenAICompatibleConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }
}

#[async_trait]
impl TranscriptionModel for OpenAICompatibleTranscriptionModel {
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
        let url = (self.config.url)("/audio/transcriptions");

        let filename = format!("audio.{}", extension_for(&options.media_type));
        let file_part = reqwest::multipart::Part::bytes(options.audio.clone())
            .file_name(filename)
            .mime_str(&options.media_type)
            .map_err(|err| ProviderError::invalid_argument("media_type", err.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model_id.clone())
            .text("response_format", "verbose_json");
        if let Some(language) = options
            .provider_options
            .as_ref()
            .and_then(|provider_options| provider_options.get(self.config.provider_options_name()))
            .and_then(|extras| extras.get("language"))
            .and_then(|value| value.as_str())
        {
            form = form.text("language", language.to_string());
        }

        let mut request = self.config.client.post(&url).multipart(form);
        for (key, value) in (self.config.headers)() {
            // Multipart sets its own content type with the part boundary.
            if key.eq_ignore_ascii_case("content-type") {
                continue;
            }
            request = request.header(key, value);
        }
        if let Some(extra) = &options.headers {
            for (key, value) in extra {
                request = request.header(key, value);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|err| ProviderError::transport(err.to_string(), redact_url(&url)))?;
        let status = response.status();
        let response_headers: inferkit_provider::shared::Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
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
                Some(response_headers),
                Some(body_text),
            ));
        }

        let parsed: TranscriptionResponseBody = serde_json::from_str(&body_text)
            .map_err(|err| ProviderError::json_parse(&body_text, err))?;

        Ok(TranscriptionResponse {
            text: parsed.text,
            segments: parsed
                .segments
                .into_iter()
                .map(|segment| TranscriptSegment {
                    text: segment.text,
                    start_seconds: segment.start,
                    end_seconds: segment.end,
                })
                .collect(),
            language: parsed.language,
            duration_seconds: parsed.duration,
            warnings: vec![],
            provider_metadata: None,
            response: Some(TranscriptionResponseMetadata {
                model_id: Some(self.model_id.clone()),
                headers: Some(response_headers),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_follow_media_types() {
        assert_eq!(extension_for("audio/wav"), "wav");
        assert_eq!(extension_for("audio/mpeg"), "mp3");
        assert_eq!(extension_for("application/x-unknown"), "bin");
    }

    #[test]
    fn verbose_json_parses_segments() {
        let body = r#"{
            "text": "hello world",
            "language": "en",
            "duration": 1.5,
            "segments": [
                {"id": 0, "text": "hello", "start": 0.0, "end": 0.7},
                {"id": 1, "text": " world", "start": 0.7, "end": 1.5}
            ]
        }"#;
        let parsed: TranscriptionResponseBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text, "hello world");
        assert_eq!(parsed.segments.len(), 2);
        assert_eq!(parsed.segments[1].start, 0.7);
    }
}
