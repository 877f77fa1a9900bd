//! Typed extraction of provider-specific options.

use inferkit_provider::ProviderError;
use inferkit_provider::shared::ProviderOptions;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse the options addressed to `provider` into a typed struct.
///
/// Returns `Ok(None)` when the caller supplied no options for that
/// provider; a present-but-malformed options object is a validation error.
pub fn parse_provider_options<T: DeserializeOwned>(
    options: Option<&ProviderOptions>,
    provider: &str,
) -> Result<Option<T>, ProviderError> {
    let Some(section) = options.and_then(|options| options.get(provider)) else {
        return Ok(None);
    };

    let value = Value::Object(
        section
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    );

    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|err| ProviderError::type_validation(value.to_string(), err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestOptions {
        safe_prompt: Option<bool>,
    }

    fn options_with(provider: &str, key: &str, value: Value) -> ProviderOptions {
        let mut inner = HashMap::new();
        inner.insert(key.to_string(), value);
        let mut outer = HashMap::new();
        outer.insert(provider.to_string(), inner);
        outer
    }

    #[test]
    fn absent_options_parse_to_none() {
        let parsed: Option<TestOptions> = parse_provider_options(None, "mistral").unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn other_providers_are_ignored() {
        let options = options_with("openai", "safe_prompt", Value::Bool(true));
        let parsed: Option<TestOptions> = parse_provider_options(Some(&options), "mistral").unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn matching_section_is_parsed() {
        let options = options_with("mistral", "safe_prompt", Value::Bool(true));
        let parsed: Option<TestOptions> = parse_provider_options(Some(&options), "mistral").unwrap();
        assert_eq!(
            parsed,
            Some(TestOptions {
                safe_prompt: Some(true)
            })
        );
    }

    #[test]
    fn malformed_section_is_a_validation_error() {
        let options = options_with("mistral", "safe_prompt", Value::String("yes".into()));
        let result: Result<Option<TestOptions>, _> =
            parse_provider_options(Some(&options), "mistral");
        assert!(matches!(result, Err(ProviderError::TypeValidation { .. })));
    }
}
