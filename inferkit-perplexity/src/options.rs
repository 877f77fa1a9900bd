use serde::{Deserialize, Serialize};

/// Provider options under the `perplexity` namespace.
///
/// Merged verbatim into the request body, so field names match
/// Perplexity's wire parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerplexityOptions {
    /// Restrict search to these domains (prefix with `-` to exclude).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_domain_filter: Option<Vec<String>>,

    /// Restrict search recency: `"day"`, `"week"`, `"month"`, `"year"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_recency_filter: Option<String>,

    /// Include related questions in the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_related_questions: Option<bool>,
}
