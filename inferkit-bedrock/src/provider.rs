use crate::auth::BedrockAuth;
use crate::embedding::BedrockEmbeddingModel;
use crate::language_model::{BedrockConfig, BedrockLanguageModel};
use inferkit_provider::{EmbeddingModel, LanguageModel, Provider, ProviderError};
use inferkit_provider_utils::api_key::load_optional_setting;
use std::sync::Arc;

/// Settings for the Bedrock provider.
#[derive(Debug, Clone, Default)]
pub struct BedrockProviderSettings {
    /// AWS region; falls back to `AWS_REGION`, then `us-east-1`.
    pub region: Option<String>,
    /// Explicit authentication; falls back to environment resolution.
    pub auth: Option<BedrockAuth>,
    /// Override the base URL.
    pub base_url: Option<String>,
}

/// The Amazon Bedrock provider.
pub struct BedrockProvider {
    config: BedrockConfig,
}

impl BedrockProvider {
    /// Create a provider from settings.
    pub fn new(settings: BedrockProviderSettings) -> Result<Self, ProviderError> {
        let region = load_optional_setting(settings.region.as_deref(), "AWS_REGION")
            .unwrap_or_else(|| "us-east-1".to_string());
        let auth = match settings.auth {
            Some(auth) => auth,
            None => BedrockAuth::from_env(&region)?,
        };
        let base_url = settings
            .base_url
            .unwrap_or_else(|| format!("https://bedrock-runtime.{region}.amazonaws.com"));

        Ok(Self {
            config: BedrockConfig {
                provider: "bedrock".to_string(),
                base_url,
                auth,
                client: reqwest::Client::new(),
            },
        })
    }
}

impl Provider for BedrockProvider {
    fn provider_id(&self) -> &str {
        "bedrock"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(BedrockLanguageModel::new(
            model_id,
            self.config.clone(),
        )))
    }

    fn text_embedding_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn EmbeddingModel<String>>, ProviderError> {
        Ok(Arc::new(BedrockEmbeddingModel::new(
            model_id,
            self.config.clone(),
        )))
    }
}

/// Create a Bedrock provider with settings resolved from the environment.
pub fn create_bedrock() -> Result<BedrockProvider, ProviderError> {
    BedrockProvider::new(BedrockProviderSettings::default())
}
