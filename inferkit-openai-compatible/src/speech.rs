//! Speech synthesis over `/audio/speech`.

use async_trait::async_trait;
use crate::settings::OpenAICompatibleConfig;
use inferkit_provider::{
    ProviderError, SpeechCallOptions, SpeechModel, SpeechResponse, SpeechResponseMetadata,
};
use inferkit_provider_utils::http::post_bytes;
use serde_json::json;

const DEFAULT_VOICE: &str = "alloy";

/// MIME type for a response format.
fn media_type_for(format: &str) -> &'static str {
    match format {
        "mp3" => "audio/mpeg",
        "opus" => "audio/opus",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "pcm" => "audio/pcm",
        _ => "application/octet-stream",
    }
}

/// A speech synthesis model over the `/audio/speech` shape.
pub struct OpenAICompatibleSpeechModel {
    model_id: String,
    config: OpenAICompatibleConfig,
}

impl OpenAICompatibleSpeechModel {
    /// Create a speech model for the given model id.
    pub fn new(model_id: impl Into<String>, config: OpenAICompatibleConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }
}

#[async_trait]
impl SpeechModel for OpenAICompatibleSpeechModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_generate(
        &self,
        options: SpeechCallOptions,
    ) -> Result<SpeechResponse, ProviderError> {
        let format = options.output_format.as_deref().unwrap_or("mp3").to_string();

        let mut body = json!({
            "model": self.model_id,
            "input": options.text,
            "voice": options.voice.as_deref().unwrap_or(DEFAULT_VOICE),
            "response_format": format,
        });
        if let Some(speed) = options.speed {
            body["speed"] = json!(speed);
        }
        if let Some(instructions) = options
            .provider_options
            .as_ref()
            .and_then(|provider_options| provider_options.get(self.config.provider_options_name()))
            .and_then(|extras| extras.get("instructions"))
        {
            body["instructions"] = instructions.clone();
        }

        let url = (self.config.url)("/audio/speech");
        let mut headers = (self.config.headers)();
        if let Some(extra) = &options.headers {
            headers.extend(extra.clone());
        }

        let (response_headers, audio) = post_bytes(
            &self.config.client,
            &url,
            &headers,
            &body,
            None,
            options.abort_signal.as_ref(),
        )
        .await?;

        let media_type = response_headers
            .get("content-type")
            .cloned()
            .unwrap_or_else(|| media_type_for(&format).to_string());

        Ok(SpeechResponse {
            audio,
            media_type: Some(media_type),
            warnings: vec![],
            response: Some(SpeechResponseMetadata {
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
    fn formats_map_to_mime_types() {
        assert_eq!(media_type_for("mp3"), "audio/mpeg");
        assert_eq!(media_type_for("wav"), "audio/wav");
        assert_eq!(media_type_for("mystery"), "application/octet-stream");
    }
}
