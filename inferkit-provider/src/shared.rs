use serde_json::Value;
use std::collections::HashMap;

/// HTTP headers attached to requests or echoed from responses.
pub type Headers = HashMap<String, String>;

/// Provider-specific metadata returned with results.
///
/// The outer key is the provider id (e.g. `"anthropic"`); the inner map is
/// free-form JSON owned by that provider's adapter. Consumers must treat
/// unknown keys as opaque.
pub type ProviderMetadata = HashMap<String, HashMap<String, Value>>;

/// Provider-specific options passed through with requests.
///
/// Mirrors [`ProviderMetadata`] in shape: the outer key selects the provider
/// the options are addressed to, so a prompt can carry knobs for several
/// providers at once and each adapter picks out its own namespace.
pub type ProviderOptions = HashMap<String, HashMap<String, Value>>;
