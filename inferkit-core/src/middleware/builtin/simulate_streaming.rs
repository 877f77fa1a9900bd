//! Streaming simulation over a generate call.

use crate::middleware::language_model::LanguageModelMiddleware;
use futures_util::stream;
use inferkit_provider::StreamResponse;
use inferkit_provider::StreamResponseMetadata;
use inferkit_provider::language_model::content::Content;
use inferkit_provider::language_model::stream_part::StreamPart;
use std::sync::Arc;

/// Middleware that implements streaming by calling generate and
/// synthesising the canonical event sequence.
///
/// Useful for models without a streaming endpoint and for exercising
/// streaming code paths deterministically: the synthetic stream carries
/// one block per text or reasoning part (start, a single delta, end),
/// consolidated tool calls, and a final finish event, so reassembling the
/// stream reproduces the generate result.
pub fn simulate_streaming_middleware() -> LanguageModelMiddleware {
    LanguageModelMiddleware::new().with_wrap_stream(Arc::new(
        |_do_stream, do_generate, _params, _model| {
            Box::pin(async move {
                let result = do_generate().await?;

                let mut parts = Vec::new();
                parts.push(StreamPart::stream_start(result.warnings.clone()));
                if let Some(metadata) = &result.response {
                    parts.push(StreamPart::ResponseMetadata(metadata.clone()));
                }

                let mut block_id = 0usize;
                for part in &result.content {
                    match part {
                        Content::Text(text) if !text.text.is_empty() => {
                            let id = block_id.to_string();
                            block_id += 1;
                            parts.push(StreamPart::text_start(&id));
                            parts.push(StreamPart::text_delta(&id, &text.text));
                            parts.push(StreamPart::text_end(&id));
                        }
                        Content::Reasoning(reasoning) if !reasoning.text.is_empty() => {
                            let id = block_id.to_string();
                            block_id += 1;
                            parts.push(StreamPart::reasoning_start(&id));
                            parts.push(StreamPart::reasoning_delta(&id, &reasoning.text));
                            parts.push(StreamPart::reasoning_end(&id));
                        }
                        Content::ToolCall(call) => {
                            parts.push(StreamPart::tool_input_start(
                                &call.tool_call_id,
                                &call.tool_name,
                            ));
                            parts.push(StreamPart::tool_input_delta(
                                &call.tool_call_id,
                                &call.input,
                            ));
                            parts.push(StreamPart::tool_input_end(&call.tool_call_id));
                            parts.push(StreamPart::ToolCall(call.clone()));
                        }
                        Content::Source(source) => {
                            parts.push(StreamPart::Source(source.clone()));
                        }
                        Content::File(file) => {
                            parts.push(StreamPart::File(file.clone()));
                        }
                        Content::Text(_) | Content::Reasoning(_) | Content::ToolResult(_) => {}
                    }
                }

                parts.push(StreamPart::Finish {
                    finish_reason: result.finish_reason,
                    usage: result.usage,
                    provider_metadata: result.provider_metadata.clone(),
                });

                Ok(StreamResponse {
                    stream: Box::new(stream::iter(parts)),
                    request: result.request,
                    response: Some(StreamResponseMetadata::default()),
                })
            })
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::wrap::wrap_language_model;
    use crate::stream_text::stream_text;
    use async_trait::async_trait;
    use inferkit_provider::language_model::call_options::CallOptions;
    use inferkit_provider::language_model::content::{Reasoning, Text, ToolCall};
    use inferkit_provider::language_model::finish_reason::FinishReason;
    use inferkit_provider::language_model::prompt::Message;
    use inferkit_provider::language_model::usage::Usage;
    use inferkit_provider::{GenerateResponse, LanguageModel, ProviderError};

    struct GenerateOnlyModel;

    #[async_trait]
    impl LanguageModel for GenerateOnlyModel {
        fn provider(&self) -> &str {
            "generate-only"
        }

        fn model_id(&self) -> &str {
            "gen-1"
        }

        async fn do_generate(&self, _: CallOptions) -> Result<GenerateResponse, ProviderError> {
            Ok(GenerateResponse {
                content: vec![
                    Content::Reasoning(Reasoning::new("thinking it through")),
                    Content::Text(Text::new("the answer is 4")),
                    Content::ToolCall(ToolCall::new("call_1", "verify", "{\"n\":4}")),
                ],
                finish_reason: FinishReason::ToolCalls,
                usage: Usage::new(11, 5),
                provider_metadata: None,
                request: None,
                response: None,
                warnings: vec![],
            })
        }

        async fn do_stream(&self, _: CallOptions) -> Result<StreamResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality(
                "doStream",
                "generate-only",
            ))
        }
    }

    #[tokio::test]
    async fn simulated_stream_reassembles_to_the_generate_result() {
        let model = wrap_language_model(
            Arc::new(GenerateOnlyModel),
            vec![simulate_streaming_middleware()],
        );

        let streamed = stream_text(&model, CallOptions::new(vec![Message::user("2+2")]))
            .await
            .unwrap();
        let collected = streamed.collect().await.unwrap();

        assert_eq!(collected.reasoning_text(), "thinking it through");
        assert_eq!(collected.text(), "the answer is 4");
        assert_eq!(collected.tool_calls().len(), 1);
        assert_eq!(collected.tool_calls()[0].input, "{\"n\":4}");
        assert_eq!(collected.finish_reason, FinishReason::ToolCalls);
        assert_eq!(collected.usage.total(), 16);
    }

    #[tokio::test]
    async fn event_grammar_holds() {
        use futures_util::StreamExt;

        let model = wrap_language_model(
            Arc::new(GenerateOnlyModel),
            vec![simulate_streaming_middleware()],
        );
        let streamed = stream_text(&model, CallOptions::new(vec![Message::user("2+2")]))
            .await
            .unwrap();
        let parts: Vec<StreamPart> = streamed.stream.collect().await;

        // Every delta's id was opened and not yet closed; exactly one
        // finish event, and it is last.
        let mut open: Vec<String> = Vec::new();
        let mut finishes = 0;
        for (index, part) in parts.iter().enumerate() {
            match part {
                StreamPart::TextStart { id }
                | StreamPart::ReasoningStart { id, .. }
                | StreamPart::ToolInputStart { id, .. } => open.push(id.clone()),
                StreamPart::TextDelta { id, .. }
                | StreamPart::ReasoningDelta { id, .. }
                | StreamPart::ToolInputDelta { id, .. } => {
                    assert!(open.contains(id), "delta for unopened block {id}");
                }
                StreamPart::TextEnd { id }
                | StreamPart::ReasoningEnd { id }
                | StreamPart::ToolInputEnd { id } => {
                    open.retain(|existing| existing != id);
                }
                StreamPart::Finish { .. } => {
                    finishes += 1;
                    assert_eq!(index, parts.len() - 1, "finish must be last");
                }
                _ => {}
            }
        }
        assert_eq!(finishes, 1);
    }
}
