//! Non-streaming text generation.

use crate::prompt::validate_prompt;
use inferkit_provider::language_model::call_options::CallOptions;
use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::language_model::content::{Content, ToolCall};
use inferkit_provider::language_model::finish_reason::FinishReason;
use inferkit_provider::language_model::response_metadata::ResponseMetadata;
use inferkit_provider::language_model::usage::Usage;
use inferkit_provider::shared::ProviderMetadata;
use inferkit_provider::{GenerateResponse, LanguageModel, ProviderError, RequestMetadata};
use std::sync::Arc;

/// Generate text with the given model.
///
/// The prompt is validated before any network traffic; the adapter's
/// response is returned as a [`GenerateTextResult`] with derived accessors
/// over the ordered content list.
pub async fn generate_text(
    model: &Arc<dyn LanguageModel>,
    options: CallOptions,
) -> Result<GenerateTextResult, ProviderError> {
    validate_prompt(&options.prompt)?;
    let response = model.do_generate(options).await?;
    Ok(GenerateTextResult::from_response(response))
}

/// Result of a non-streaming generation.
#[derive(Debug, Clone)]
pub struct GenerateTextResult {
    /// The ordered content parts.
    pub content: Vec<Content>,
    /// Why generation finished.
    pub finish_reason: FinishReason,
    /// Token usage.
    pub usage: Usage,
    /// Non-fatal warnings.
    pub warnings: Vec<CallWarning>,
    /// Provider-specific metadata.
    pub provider_metadata: Option<ProviderMetadata>,
    /// Echo of the request that was sent.
    pub request: Option<RequestMetadata>,
    /// Server-echoed response metadata.
    pub response: Option<ResponseMetadata>,
}

impl GenerateTextResult {
    pub(crate) fn from_response(response: GenerateResponse) -> Self {
        Self {
            content: response.content,
            finish_reason: response.finish_reason,
            usage: response.usage,
            warnings: response.warnings,
            provider_metadata: response.provider_metadata,
            request: response.request,
            response: response.response,
        }
    }

    /// All top-level text parts joined into one string.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                Content::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All reasoning parts joined into one string.
    pub fn reasoning_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                Content::Reasoning(reasoning) => Some(reasoning.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The tool calls requested by the model, in order.
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.content
            .iter()
            .filter_map(|part| match part {
                Content::ToolCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inferkit_provider::language_model::content::Text;
    use inferkit_provider::language_model::prompt::Message;
    use inferkit_provider::{StreamResponse};

    struct StaticModel;

    #[async_trait]
    impl LanguageModel for StaticModel {
        fn provider(&self) -> &str {
            "static"
        }

        fn model_id(&self) -> &str {
            "static-1"
        }

        async fn do_generate(&self, _: CallOptions) -> Result<GenerateResponse, ProviderError> {
            Ok(GenerateResponse {
                content: vec![
                    Content::Text(Text::new("Hi")),
                    Content::ToolCall(ToolCall::new("call_1", "lookup", "{}")),
                ],
                finish_reason: FinishReason::Stop,
                usage: Usage::new(3, 1),
                provider_metadata: None,
                request: None,
                response: None,
                warnings: vec![],
            })
        }

        async fn do_stream(&self, _: CallOptions) -> Result<StreamResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doStream", "static"))
        }
    }

    #[tokio::test]
    async fn returns_text_and_tool_calls() {
        let model: Arc<dyn LanguageModel> = Arc::new(StaticModel);
        let result = generate_text(&model, CallOptions::new(vec![Message::user("Say hi")]))
            .await
            .unwrap();
        assert_eq!(result.text(), "Hi");
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert_eq!(result.usage.total(), 4);
        assert_eq!(result.tool_calls().len(), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_prompts_before_dispatch() {
        let model: Arc<dyn LanguageModel> = Arc::new(StaticModel);
        let err = generate_text(&model, CallOptions::new(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidPrompt { .. }));
    }
}
