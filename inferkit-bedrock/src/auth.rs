//! Bedrock authentication strategies.

use crate::sigv4::{SigV4Credentials, sign_request};
use chrono::Utc;
use inferkit_provider::ProviderError;
use inferkit_provider::shared::Headers;

/// How Bedrock requests authenticate.
#[derive(Debug, Clone)]
pub enum BedrockAuth {
    /// SigV4 signing over the request body.
    SigV4(SigV4Credentials),
    /// Bearer token (`AWS_BEARER_TOKEN_BEDROCK`).
    Bearer(String),
}

impl BedrockAuth {
    /// Resolve authentication from the environment: a bearer token wins,
    /// otherwise access keys are required.
    pub fn from_env(region: &str) -> Result<Self, ProviderError> {
        if let Ok(token) = std::env::var("AWS_BEARER_TOKEN_BEDROCK") {
            if !token.is_empty() {
                return Ok(Self::Bearer(token));
            }
        }

        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok().filter(|key| !key.is_empty());
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                Ok(Self::SigV4(SigV4Credentials {
                    access_key_id,
                    secret_access_key,
                    session_token: std::env::var("AWS_SESSION_TOKEN")
                        .ok()
                        .filter(|token| !token.is_empty()),
                    region: region.to_string(),
                    service: "bedrock".to_string(),
                }))
            }
            _ => Err(ProviderError::LoadAPIKey {
                message: "Bedrock credentials are missing. Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY (with optional AWS_SESSION_TOKEN), or AWS_BEARER_TOKEN_BEDROCK.".to_string(),
            }),
        }
    }

    /// Produce authenticated headers for a request with the given body.
    pub fn headers(
        &self,
        method: &str,
        url: &str,
        body: &[u8],
    ) -> Result<Headers, ProviderError> {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        match self {
            Self::Bearer(token) => {
                headers.insert("authorization".to_string(), format!("Bearer {token}"));
            }
            Self::SigV4(credentials) => {
                sign_request(credentials, method, url, &mut headers, body, Utc::now())?;
            }
        }
        Ok(headers)
    }
}
