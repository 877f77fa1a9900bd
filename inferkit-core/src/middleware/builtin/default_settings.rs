//! Default parameter injection.

use crate::middleware::language_model::LanguageModelMiddleware;
use inferkit_provider::language_model::prompt::Message;
use std::sync::Arc;

/// Defaults applied to parameters the caller left unset.
#[derive(Debug, Clone, Default)]
pub struct DefaultSettings {
    /// Default temperature.
    pub temperature: Option<f64>,
    /// Default nucleus sampling value.
    pub top_p: Option<f64>,
    /// Default output token limit.
    pub max_output_tokens: Option<u32>,
    /// System message inserted when the prompt has none.
    pub system_message: Option<String>,
}

/// Middleware that fills unset parameters with organisation-wide defaults.
///
/// Explicit caller values always win; the default system message is only
/// inserted when the prompt does not already start with one.
pub fn default_settings_middleware(defaults: DefaultSettings) -> LanguageModelMiddleware {
    LanguageModelMiddleware::new().with_transform_params(Arc::new(move |mut params, _, _| {
        let defaults = defaults.clone();
        Box::pin(async move {
            if params.temperature.is_none() {
                params.temperature = defaults.temperature;
            }
            if params.top_p.is_none() {
                params.top_p = defaults.top_p;
            }
            if params.max_output_tokens.is_none() {
                params.max_output_tokens = defaults.max_output_tokens;
            }

            if let Some(system) = &defaults.system_message {
                let has_system = matches!(params.prompt.first(), Some(Message::System(_)));
                if !has_system {
                    params.prompt.insert(0, Message::system(system.clone()));
                }
            }

            Ok(params)
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::language_model::{ModelInfo, OperationType};
    use inferkit_provider::language_model::call_options::CallOptions;

    fn info() -> ModelInfo {
        ModelInfo {
            provider: "p".into(),
            model_id: "m".into(),
        }
    }

    #[tokio::test]
    async fn fills_unset_parameters_only() {
        let middleware = default_settings_middleware(DefaultSettings {
            temperature: Some(0.7),
            max_output_tokens: Some(1000),
            ..Default::default()
        });
        let transform = middleware.transform_params.unwrap();

        let options = CallOptions::new(vec![Message::user("hi")]).with_temperature(0.1);
        let transformed = transform(options, OperationType::Generate, info())
            .await
            .unwrap();

        assert_eq!(transformed.temperature, Some(0.1));
        assert_eq!(transformed.max_output_tokens, Some(1000));
    }

    #[tokio::test]
    async fn inserts_system_message_when_absent() {
        let middleware = default_settings_middleware(DefaultSettings {
            system_message: Some("You are helpful.".into()),
            ..Default::default()
        });
        let transform = middleware.transform_params.unwrap();

        let transformed = transform(
            CallOptions::new(vec![Message::user("hi")]),
            OperationType::Generate,
            info(),
        )
        .await
        .unwrap();
        assert!(matches!(transformed.prompt[0], Message::System(_)));
        assert_eq!(transformed.prompt.len(), 2);

        // An existing system message is left alone.
        let already = transform(
            CallOptions::new(vec![Message::system("custom"), Message::user("hi")]),
            OperationType::Generate,
            info(),
        )
        .await
        .unwrap();
        assert_eq!(already.prompt.len(), 2);
        match &already.prompt[0] {
            Message::System(system) => assert_eq!(system.content, "custom"),
            other => panic!("expected system message, got {other:?}"),
        }
    }
}
