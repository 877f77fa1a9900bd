use inferkit_provider::ProviderError;
use thiserror::Error;

/// Errors from registry lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The provider id is not registered.
    #[error(
        "No such provider: '{provider_id}' for {model_type} '{model_id}' (available providers: {available_providers:?})"
    )]
    NoSuchProvider {
        /// The unknown provider id.
        provider_id: String,
        /// The full model id that was looked up.
        model_id: String,
        /// Which model type was requested.
        model_type: &'static str,
        /// The provider ids that are registered.
        available_providers: Vec<String>,
    },

    /// The model id is malformed or unknown within its provider.
    #[error("No such model: '{model_id}' ({message})")]
    NoSuchModel {
        /// The model id that was looked up.
        model_id: String,
        /// Which model type was requested.
        model_type: &'static str,
        /// Details of the failure.
        message: String,
    },

    /// The provider failed for a reason other than an unknown model.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
