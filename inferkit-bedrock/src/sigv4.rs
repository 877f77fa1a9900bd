//! AWS Signature Version 4 request signing.
//!
//! Implements the canonical signing algorithm directly: canonical request,
//! string to sign over the hashed canonical request, and the four-step
//! HMAC key derivation. Only what Bedrock needs is covered — POST/GET with
//! a known body, no query-string canonicalisation beyond pass-through.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use inferkit_provider::ProviderError;
use inferkit_provider::shared::Headers;
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Credentials and scope for signing.
#[derive(Debug, Clone)]
pub struct SigV4Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: String,
    pub service: String,
}

/// Sign a request, inserting `x-amz-date`, `x-amz-security-token` (when a
/// session token is present) and `authorization` into `headers`.
///
/// Headers already present in the map participate in the signature, so
/// callers must add `content-type` before signing.
pub fn sign_request(
    credentials: &SigV4Credentials,
    method: &str,
    url: &str,
    headers: &mut Headers,
    body: &[u8],
    timestamp: DateTime<Utc>,
) -> Result<(), ProviderError> {
    let parsed = Url::parse(url)
        .map_err(|err| ProviderError::invalid_argument("url", err.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ProviderError::invalid_argument("url", "missing host"))?
        .to_string();

    let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = timestamp.format("%Y%m%d").to_string();

    headers.insert("host".to_string(), host);
    headers.insert("x-amz-date".to_string(), amz_date.clone());
    if let Some(token) = &credentials.session_token {
        headers.insert("x-amz-security-token".to_string(), token.clone());
    }

    // Canonical headers: lowercase names, trimmed values, sorted by name.
    let mut sorted: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    sorted.sort();

    let canonical_headers: String = sorted
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = sorted
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let payload_hash = hex::encode(Sha256::digest(body));

    let canonical_uri = if parsed.path().is_empty() {
        "/"
    } else {
        parsed.path()
    };
    let canonical_request = format!(
        "{method}\n{canonical_uri}\n{query}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        query = parsed.query().unwrap_or(""),
    );

    let credential_scope = format!(
        "{date_stamp}/{region}/{service}/aws4_request",
        region = credentials.region,
        service = credentials.service,
    );
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{amz_date}\n{credential_scope}\n{hash}",
        hash = hex::encode(Sha256::digest(canonical_request.as_bytes())),
    );

    let date_key = hmac(
        format!("AWS4{}", credentials.secret_access_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let region_key = hmac(&date_key, credentials.region.as_bytes())?;
    let service_key = hmac(&region_key, credentials.service.as_bytes())?;
    let signing_key = hmac(&service_key, b"aws4_request")?;
    let signature = hex::encode(hmac(&signing_key, string_to_sign.as_bytes())?);

    headers.insert(
        "authorization".to_string(),
        format!(
            "AWS4-HMAC-SHA256 Credential={access_key}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
            access_key = credentials.access_key_id,
        ),
    );

    Ok(())
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| ProviderError::model_error(format!("HMAC key error: {err}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// The `get-vanilla` vector from the AWS SigV4 test suite.
    #[test]
    fn matches_the_reference_signature() {
        let credentials = SigV4Credentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into(),
            session_token: None,
            region: "us-east-1".into(),
            service: "service".into(),
        };
        let timestamp = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();

        let mut headers = Headers::new();
        sign_request(
            &credentials,
            "GET",
            "https://example.amazonaws.com/",
            &mut headers,
            b"",
            timestamp,
        )
        .unwrap();

        let authorization = headers.get("authorization").unwrap();
        assert!(authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request"
        ));
        assert!(authorization.contains("SignedHeaders=host;x-amz-date"));
        assert!(authorization.ends_with(
            "Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        ));
    }

    #[test]
    fn session_token_joins_the_signed_headers() {
        let credentials = SigV4Credentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "secret".into(),
            session_token: Some("session-token".into()),
            region: "us-west-2".into(),
            service: "bedrock".into(),
        };
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        sign_request(
            &credentials,
            "POST",
            "https://bedrock-runtime.us-west-2.amazonaws.com/model/titan/converse",
            &mut headers,
            br#"{"messages":[]}"#,
            timestamp,
        )
        .unwrap();

        assert_eq!(headers.get("x-amz-security-token").unwrap(), "session-token");
        assert!(
            headers
                .get("authorization")
                .unwrap()
                .contains("content-type;host;x-amz-date;x-amz-security-token")
        );
    }
}
