use inferkit_openai_compatible::chat::ChatLanguageModel;
use inferkit_openai_compatible::settings::OpenAICompatibleConfig;
use inferkit_provider::shared::Headers;
use inferkit_provider::{LanguageModel, Provider, ProviderError};
use inferkit_provider_utils::api_key::load_api_key;
use serde_json::Value;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

/// Settings for the xAI provider.
#[derive(Debug, Clone, Default)]
pub struct XaiProviderSettings {
    /// Explicit API key; falls back to `XAI_API_KEY`.
    pub api_key: Option<String>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The xAI provider.
pub struct XaiProvider {
    config: OpenAICompatibleConfig,
}

/// Drop `reasoning_effort` for models that reject it.
fn scrub_reasoning_effort(mut body: Value) -> Value {
    let is_mini = body
        .get("model")
        .and_then(Value::as_str)
        .is_some_and(|model| model.starts_with("grok-3-mini"));
    if !is_mini {
        if let Some(object) = body.as_object_mut() {
            object.remove("reasoning_effort");
        }
    }
    body
}

impl XaiProvider {
    /// Create a provider from settings.
    pub fn new(settings: XaiProviderSettings) -> Result<Self, ProviderError> {
        let api_key = load_api_key(settings.api_key.as_deref(), "XAI_API_KEY", "xAI")?;

        let headers = Arc::new(move || {
            let mut headers = Headers::new();
            headers.insert("authorization".to_string(), format!("Bearer {api_key}"));
            headers
        });

        let config = OpenAICompatibleConfig::new(
            "xai.chat",
            settings
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            headers,
        )
        .with_transform_request_body(Arc::new(scrub_reasoning_effort));

        Ok(Self { config })
    }
}

impl Provider for XaiProvider {
    fn provider_id(&self) -> &str {
        "xai"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(ChatLanguageModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create an xAI provider with default settings.
pub fn create_xai() -> Result<XaiProvider, ProviderError> {
    XaiProvider::new(XaiProviderSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reasoning_effort_survives_only_on_grok_3_mini() {
        let mini = scrub_reasoning_effort(json!({
            "model": "grok-3-mini-fast",
            "reasoning_effort": "high",
        }));
        assert_eq!(mini["reasoning_effort"], "high");

        let full = scrub_reasoning_effort(json!({
            "model": "grok-4",
            "reasoning_effort": "high",
        }));
        assert!(full.get("reasoning_effort").is_none());
    }
}
