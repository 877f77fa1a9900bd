//! Credential loading.

use inferkit_provider::ProviderError;

/// Resolve an API key from an explicit setting or an environment variable.
///
/// The explicit value wins. A missing key is a configuration error raised
/// before any network call is made.
pub fn load_api_key(
    explicit: Option<&str>,
    env_var: &str,
    description: &str,
) -> Result<String, ProviderError> {
    if let Some(key) = explicit {
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }

    match std::env::var(env_var) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(ProviderError::LoadAPIKey {
            message: format!(
                "{description} API key is missing. Pass it in the provider settings or set the {env_var} environment variable."
            ),
        }),
    }
}

/// Resolve an optional setting from an explicit value or an environment
/// variable, without failing when both are absent.
pub fn load_optional_setting(explicit: Option<&str>, env_var: &str) -> Option<String> {
    if let Some(value) = explicit {
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    std::env::var(env_var).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins() {
        let key = load_api_key(Some("sk-explicit"), "INFERKIT_TEST_KEY_UNSET", "Test").unwrap();
        assert_eq!(key, "sk-explicit");
    }

    #[test]
    fn missing_key_is_a_load_error() {
        let err = load_api_key(None, "INFERKIT_TEST_KEY_UNSET", "Test").unwrap_err();
        assert!(matches!(err, ProviderError::LoadAPIKey { .. }));
    }
}
