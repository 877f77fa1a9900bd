//! Image generation over the `/images/generations` endpoint.

use crate::settings::OpenAICompatibleConfig;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::{
    ImageCallOptions, ImageModel, ImageResponse, ImageResponseMetadata, ProviderError,
};
use inferkit_provider_utils::http::{get_bytes, post_json};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

/// An image model for OpenAI-compatible services.
///
/// Responses carry either base64 payloads or URLs; both are normalised to
/// raw byte buffers before they reach the caller.
pub struct OpenAICompatibleImageModel {
    model_id: String,
    config: OpenAICompatibleConfig,
}

#[derive(Debug, Deserialize)]
struct ImagesResponseBody {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

impl OpenAICompatibleImageModel {
    /// Create an image model for the given model id.
    pub fn new(model_id: impl Into<String>, config: OpenAICompatibleConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }
}

#[async_trait]
impl ImageModel for OpenAICompatibleImageModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_generate(&self, options: ImageCallOptions) -> Result<ImageResponse, ProviderError> {
        let mut warnings = Vec::new();

        let mut body = json!({
            "model": self.model_id,
            "prompt": options.prompt,
            "n": options.n,
            "response_format": "b64_json",
        });
        if let Some(size) = &options.size {
            body["size"] = json!(size);
        }
        if options.aspect_ratio.is_some() {
            warnings.push(CallWarning::unsupported_setting_with_details(
                "aspectRatio",
                "use `size` instead",
            ));
        }
        if options.seed.is_some() {
            warnings.push(CallWarning::unsupported_setting("seed"));
        }
        if let Some(extras) = options
            .provider_options
            .as_ref()
            .and_then(|options| options.get(self.config.provider_options_name()))
        {
            for (key, value) in extras {
                body[key] = value.clone();
            }
        }

        let url = (self.config.url)("/images/generations");
        let mut headers: HashMap<String, String> = (self.config.headers)();
        if let Some(extra) = &options.headers {
            headers.extend(extra.clone());
        }

        let response = post_json(
            &self.config.client,
            &url,
            &headers,
            &body,
            // Image generation regularly exceeds the default timeout.
            Some(std::time::Duration::from_secs(300)),
            options.abort_signal.as_ref(),
        )
        .await?;

        let parsed: ImagesResponseBody = serde_json::from_value(response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            })?;

        let mut images = Vec::with_capacity(parsed.data.len());
        for datum in parsed.data {
            if let Some(b64) = datum.b64_json {
                let bytes = STANDARD
                    .decode(b64.as_bytes())
                    .map_err(|err| ProviderError::InvalidResponseData {
                        message: format!("invalid base64 image payload: {err}"),
                        data: String::new(),
                    })?;
                images.push(bytes);
            } else if let Some(image_url) = datum.url {
                let (_, bytes) = get_bytes(
                    &self.config.client,
                    &image_url,
                    &HashMap::new(),
                    None,
                    options.abort_signal.as_ref(),
                )
                .await?;
                images.push(bytes);
            }
        }

        if images.is_empty() {
            return Err(ProviderError::NoContentGenerated {
                message: "image response contained no images".to_string(),
            });
        }

        Ok(ImageResponse {
            images,
            warnings,
            response: Some(ImageResponseMetadata {
                model_id: Some(self.model_id.clone()),
                headers: Some(response.headers),
            }),
        })
    }
}
