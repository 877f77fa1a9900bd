use crate::shared::Headers;
use thiserror::Error;

/// Errors that can occur when working with providers.
///
/// The taxonomy covers five kinds of failure:
///
/// - **configuration** errors raised before any network call
///   ([`LoadAPIKey`](ProviderError::LoadAPIKey),
///   [`LoadSetting`](ProviderError::LoadSetting),
///   [`InvalidPrompt`](ProviderError::InvalidPrompt),
///   [`InvalidArgument`](ProviderError::InvalidArgument),
///   [`NoSuchModel`](ProviderError::NoSuchModel),
///   [`UnsupportedFunctionality`](ProviderError::UnsupportedFunctionality))
/// - **transport and HTTP protocol** failures
///   ([`APICallError`](ProviderError::APICallError), which records whether a
///   retry is worthwhile)
/// - **decoding** failures ([`JSONParse`](ProviderError::JSONParse),
///   [`InvalidResponseData`](ProviderError::InvalidResponseData),
///   [`EmptyResponseBody`](ProviderError::EmptyResponseBody))
/// - **validation** failures ([`TypeValidation`](ProviderError::TypeValidation))
/// - **cancellation** ([`Cancelled`](ProviderError::Cancelled)), kept distinct
///   from transport errors so callers can tell an abort apart from a failure
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested model was not found in this provider.
    #[error("No such model: {model_id} (provider: {provider_id})")]
    NoSuchModel {
        /// The id of the model that was not found
        model_id: String,
        /// The id of the provider
        provider_id: String,
    },

    /// A generic error raised while using the model.
    #[error("Model error: {message}")]
    ModelError {
        /// The error message
        message: String,
    },

    /// A failed API call, carrying the request and response details.
    ///
    /// Retryability is derived from the HTTP status code when the error is
    /// constructed: 408, 409, 429 and 5xx are retryable, as are pure
    /// transport failures with no status at all. Everything else is not.
    #[error("API call failed: {message}")]
    APICallError {
        /// The error message, including the provider's parsed error body
        /// message when one was available
        message: String,
        /// The URL that was called, with credentials redacted
        url: String,
        /// HTTP status code, if a response was received
        status_code: Option<u16>,
        /// Response headers, if a response was received
        response_headers: Option<Headers>,
        /// Raw response body, if one was received
        response_body: Option<String>,
        /// Whether retrying the request may succeed
        is_retryable: bool,
    },

    /// A response that was expected to have a body arrived empty.
    #[error("Empty response body: {message}")]
    EmptyResponseBody {
        /// The error message
        message: String,
    },

    /// A function argument was invalid.
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        /// The name of the invalid argument
        argument: String,
        /// The error message
        message: String,
    },

    /// A prompt was structurally invalid and was rejected before dispatch.
    #[error("Invalid prompt: {message}")]
    InvalidPrompt {
        /// The error message
        message: String,
    },

    /// The server returned data the adapter could not make sense of.
    #[error("Invalid response data: {message}")]
    InvalidResponseData {
        /// The error message
        message: String,
        /// The offending data, serialized for debugging
        data: String,
    },

    /// JSON parsing failed.
    #[error("JSON parsing failed: {message}")]
    JSONParse {
        /// The text that failed to parse (possibly truncated)
        text: String,
        /// The underlying parser message
        message: String,
    },

    /// An API key could not be loaded from configuration or the environment.
    #[error("Failed to load API key: {message}")]
    LoadAPIKey {
        /// The error message
        message: String,
    },

    /// A configuration setting could not be loaded.
    #[error("Failed to load setting: {message}")]
    LoadSetting {
        /// The error message
        message: String,
    },

    /// The provider returned a response with no usable content.
    #[error("No content generated: {message}")]
    NoContentGenerated {
        /// The error message
        message: String,
    },

    /// More values were passed to a single embedding call than the model
    /// accepts.
    #[error(
        "Too many embedding values for call: the {provider} model '{model_id}' can embed at most {max_embeddings_per_call} values per call, but {values_count} were provided"
    )]
    TooManyEmbeddingValuesForCall {
        /// The provider name
        provider: String,
        /// The model id
        model_id: String,
        /// Maximum values allowed per call
        max_embeddings_per_call: usize,
        /// Number of values provided
        values_count: usize,
    },

    /// Structured-output or argument validation failed.
    #[error("Type validation failed: {message}")]
    TypeValidation {
        /// The value that failed validation, serialized for debugging
        value: String,
        /// The validation failure message
        message: String,
    },

    /// The provider does not support the requested operation.
    #[error("'{functionality}' is not supported by the {provider} provider")]
    UnsupportedFunctionality {
        /// The name of the unsupported functionality
        functionality: String,
        /// The provider id
        provider: String,
    },

    /// The operation was cancelled through its abort signal.
    #[error("Operation cancelled: {operation}")]
    Cancelled {
        /// The operation that was cancelled
        operation: String,
    },
}

impl ProviderError {
    /// Create a no-such-model error.
    pub fn no_such_model(model_id: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self::NoSuchModel {
            model_id: model_id.into(),
            provider_id: provider_id.into(),
        }
    }

    /// Create a generic model error.
    pub fn model_error(message: impl Into<String>) -> Self {
        Self::ModelError {
            message: message.into(),
        }
    }

    /// Create an API call error with no HTTP response (transport failure).
    ///
    /// Transport failures are always considered retryable.
    pub fn transport(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::APICallError {
            message: message.into(),
            url: url.into(),
            status_code: None,
            response_headers: None,
            response_body: None,
            is_retryable: true,
        }
    }

    /// Create an API call error from an HTTP response.
    ///
    /// Retryability is derived from the status code.
    pub fn api_call(
        message: impl Into<String>,
        url: impl Into<String>,
        status_code: u16,
        response_headers: Option<Headers>,
        response_body: Option<String>,
    ) -> Self {
        Self::APICallError {
            message: message.into(),
            url: url.into(),
            status_code: Some(status_code),
            response_headers,
            response_body,
            is_retryable: retryable_status(status_code),
        }
    }

    /// Create an invalid-prompt error.
    pub fn invalid_prompt(message: impl Into<String>) -> Self {
        Self::InvalidPrompt {
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create a JSON parse error from the offending text and parser error.
    pub fn json_parse(text: &str, cause: impl std::fmt::Display) -> Self {
        const MAX_SNIPPET: usize = 512;
        let snippet = if text.len() > MAX_SNIPPET {
            let mut end = MAX_SNIPPET;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            &text[..end]
        } else {
            text
        };
        Self::JSONParse {
            text: snippet.to_string(),
            message: cause.to_string(),
        }
    }

    /// Create a type-validation error.
    pub fn type_validation(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeValidation {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-functionality error.
    pub fn unsupported_functionality(
        functionality: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self::UnsupportedFunctionality {
            functionality: functionality.into(),
            provider: provider.into(),
        }
    }

    /// Create a cancellation error for the named operation.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Whether retrying the failed operation may succeed.
    ///
    /// Only API call errors are ever retryable; every other variant is a
    /// configuration, decoding or validation problem that a retry cannot fix.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::APICallError {
                is_retryable: true,
                ..
            }
        )
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::APICallError { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// The raw response body carried by this error, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::APICallError { response_body, .. } => response_body.as_deref(),
            _ => None,
        }
    }
}

fn retryable_status(status: u16) -> bool {
    status == 408 || status == 409 || status == 429 || status >= 500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        for status in [408, 409, 429, 500, 502, 503] {
            let err = ProviderError::api_call("boom", "https://api.test", status, None, None);
            assert!(err.is_retryable(), "status {status} should be retryable");
        }
        for status in [400, 401, 403, 404, 422] {
            let err = ProviderError::api_call("boom", "https://api.test", status, None, None);
            assert!(!err.is_retryable(), "status {status} should not be retryable");
        }
    }

    #[test]
    fn transport_errors_are_retryable() {
        let err = ProviderError::transport("connection reset", "https://api.test");
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn non_api_errors_are_not_retryable() {
        assert!(!ProviderError::invalid_prompt("empty").is_retryable());
        assert!(!ProviderError::cancelled("generate").is_retryable());
    }

    #[test]
    fn json_parse_truncates_long_text() {
        let text = "x".repeat(2048);
        let err = ProviderError::json_parse(&text, "eof");
        match err {
            ProviderError::JSONParse { text, .. } => assert_eq!(text.len(), 512),
            _ => panic!("expected JSONParse"),
        }
    }
}
