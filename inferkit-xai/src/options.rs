use serde::{Deserialize, Serialize};

/// Provider options under the `xai` namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XaiOptions {
    /// Live-search configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_parameters: Option<XaiSearchParameters>,

    /// Reasoning effort, `"low"` or `"high"`; grok-3-mini models only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
}

/// Live-search parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XaiSearchParameters {
    /// `"off"`, `"auto"` or `"on"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Restrict results to content published after this date (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,

    /// Restrict results to content published before this date (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,

    /// Return the consulted sources with the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_citations: Option<bool>,

    /// Per-source filters (web domains, handles).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<serde_json::Value>>,
}
