//! Vertex AI hosting of GenerateContent.
//!
//! Same request and response shapes as the Generative Language API, hosted
//! under regional endpoints with project/location paths and OAuth bearer
//! tokens. Region `global` uses the global endpoint host.

use crate::language_model::{GoogleAuth, GoogleConfig, GoogleLanguageModel};
use async_trait::async_trait;
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    EmbeddingCallOptions, EmbeddingModel, EmbeddingResponse, EmbeddingResponseMetadata,
    LanguageModel, Provider, ProviderError,
};
use inferkit_provider_utils::api_key::load_optional_setting;
use inferkit_provider_utils::http::post_json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const VERTEX_EMBEDDING_BATCH: usize = 250;

/// Supplies a short-lived OAuth2 access token per request.
///
/// Minting and refreshing tokens from service-account or
/// application-default credentials is the caller's concern; this is the
/// boundary the provider needs. [`StaticTokenProvider`] covers tests and
/// environments where a token is provisioned externally.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a currently valid access token.
    async fn token(&self) -> Result<String, ProviderError>;
}

/// A token provider returning a fixed token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Wrap an externally provisioned token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String, ProviderError> {
        Ok(self.token.clone())
    }
}

/// Settings for the Vertex AI provider.
pub struct GoogleVertexSettings {
    /// GCP project id; falls back to `GOOGLE_VERTEX_PROJECT`.
    pub project: Option<String>,
    /// Region; falls back to `GOOGLE_VERTEX_LOCATION`, then `global`.
    pub location: Option<String>,
    /// Access token source.
    pub token_provider: Arc<dyn TokenProvider>,
    /// Extra headers sent with every request.
    pub headers: Option<Headers>,
}

/// The Vertex AI provider.
pub struct GoogleVertexProvider {
    config: GoogleConfig,
}

/// Host for a region: `global` lives on the bare host, every other region
/// on its regional host.
fn vertex_host(location: &str) -> String {
    if location == "global" {
        "aiplatform.googleapis.com".to_string()
    } else {
        format!("{location}-aiplatform.googleapis.com")
    }
}

impl GoogleVertexProvider {
    /// Create a provider from settings.
    pub fn new(settings: GoogleVertexSettings) -> Result<Self, ProviderError> {
        let project = load_optional_setting(settings.project.as_deref(), "GOOGLE_VERTEX_PROJECT")
            .ok_or_else(|| ProviderError::LoadSetting {
                message: "Google Vertex project is missing. Pass it in the provider settings or set GOOGLE_VERTEX_PROJECT.".to_string(),
            })?;
        let location = load_optional_setting(settings.location.as_deref(), "GOOGLE_VERTEX_LOCATION")
            .unwrap_or_else(|| "global".to_string());

        let host = vertex_host(&location);
        let url = Arc::new(move |model_id: &str, op: &str| {
            format!(
                "https://{host}/v1/projects/{project}/locations/{location}/publishers/google/models/{model_id}:{op}"
            )
        });

        Ok(Self {
            config: GoogleConfig {
                provider: "google.vertex".to_string(),
                url,
                auth: GoogleAuth::Token(settings.token_provider),
                extra_headers: settings.headers.unwrap_or_default(),
                client: reqwest::Client::new(),
            },
        })
    }
}

impl Provider for GoogleVertexProvider {
    fn provider_id(&self) -> &str {
        "google-vertex"
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        Ok(Arc::new(GoogleLanguageModel::new(
            model_id,
            self.config.clone(),
        )))
    }

    fn text_embedding_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn EmbeddingModel<String>>, ProviderError> {
        Ok(Arc::new(VertexEmbeddingModel {
            model_id: model_id.to_string(),
            config: self.config.clone(),
        }))
    }
}

/// Create a Vertex provider for a token source, reading project and
/// location from the environment.
pub fn create_vertex(token_provider: Arc<dyn TokenProvider>) -> Result<GoogleVertexProvider, ProviderError> {
    GoogleVertexProvider::new(GoogleVertexSettings {
        project: None,
        location: None,
        token_provider,
        headers: None,
    })
}

/// Vertex text embeddings over the `predict` RPC.
pub struct VertexEmbeddingModel {
    model_id: String,
    config: GoogleConfig,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    embeddings: PredictionEmbeddings,
}

#[derive(Debug, Deserialize)]
struct PredictionEmbeddings {
    values: Vec<f32>,
    #[serde(default)]
    statistics: Option<PredictionStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictionStatistics {
    #[serde(default)]
    token_count: Option<u64>,
}

#[async_trait]
impl EmbeddingModel<String> for VertexEmbeddingModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn max_embeddings_per_call(&self) -> Option<usize> {
        Some(VERTEX_EMBEDDING_BATCH)
    }

    fn supports_parallel_calls(&self) -> bool {
        true
    }

    async fn do_embed(
        &self,
        options: EmbeddingCallOptions<String>,
    ) -> Result<EmbeddingResponse, ProviderError> {
        if options.values.len() > VERTEX_EMBEDDING_BATCH {
            return Err(ProviderError::TooManyEmbeddingValuesForCall {
                provider: self.config.provider.clone(),
                model_id: self.model_id.clone(),
                max_embeddings_per_call: VERTEX_EMBEDDING_BATCH,
                values_count: options.values.len(),
            });
        }

        let instances: Vec<_> = options
            .values
            .iter()
            .map(|value| json!({"content": value}))
            .collect();
        let body = json!({ "instances": instances });

        let url = (self.config.url)(&self.model_id, "predict");
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

        let parsed: PredictResponse = serde_json::from_value(response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            })?;

        let mut tokens = 0u64;
        let embeddings = parsed
            .predictions
            .into_iter()
            .map(|prediction| {
                if let Some(statistics) = &prediction.embeddings.statistics {
                    tokens += statistics.token_count.unwrap_or(0);
                }
                prediction.embeddings.values
            })
            .collect();

        Ok(EmbeddingResponse {
            embeddings,
            usage: Some(inferkit_provider::EmbeddingUsage { tokens }),
            provider_metadata: None,
            response: Some(EmbeddingResponseMetadata {
                id: None,
                model_id: Some(self.model_id.clone()),
                headers: Some(response.headers),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_region_uses_the_bare_host() {
        assert_eq!(vertex_host("global"), "aiplatform.googleapis.com");
        assert_eq!(
            vertex_host("europe-west4"),
            "europe-west4-aiplatform.googleapis.com"
        );
    }

    #[tokio::test]
    async fn url_embeds_project_and_location() {
        let provider = GoogleVertexProvider::new(GoogleVertexSettings {
            project: Some("my-project".into()),
            location: Some("us-central1".into()),
            token_provider: Arc::new(StaticTokenProvider::new("token")),
            headers: None,
        })
        .unwrap();

        let url = (provider.config.url)("gemini-2.0-flash", "generateContent");
        assert_eq!(
            url,
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-project/locations/us-central1/publishers/google/models/gemini-2.0-flash:generateContent"
        );
    }
}
