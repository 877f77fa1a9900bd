use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata echoed by the server with a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Server-assigned response id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The model id the server actually used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    /// Server-reported creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ResponseMetadata {
    /// Build metadata from the id/model/created fields most wire formats carry.
    pub fn from_parts(
        id: Option<String>,
        model_id: Option<String>,
        created_unix_seconds: Option<i64>,
    ) -> Self {
        Self {
            id,
            model_id,
            timestamp: created_unix_seconds.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}
