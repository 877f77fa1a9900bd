//! Extraction of XML-tagged reasoning from response text.

use crate::middleware::language_model::LanguageModelMiddleware;
use inferkit_provider::language_model::content::{Content, Reasoning, Text};
use std::sync::Arc;

/// Middleware that pulls `<tag>…</tag>` spans out of text content and
/// exposes them as reasoning parts.
///
/// The spans are removed from the text; where a span sat between two
/// non-empty text segments the segments are joined with `\n`. The union of
/// the remaining text and the extracted reasoning reconstructs the
/// original. Applies to generate calls only: partial tags across stream
/// chunks cannot be rewritten reliably.
pub fn extract_reasoning_middleware(tag_name: &str) -> LanguageModelMiddleware {
    extract_reasoning_middleware_with_separator(tag_name, "\n")
}

/// [`extract_reasoning_middleware`] with an explicit join separator.
pub fn extract_reasoning_middleware_with_separator(
    tag_name: &str,
    separator: &str,
) -> LanguageModelMiddleware {
    let opening = format!("<{tag_name}>");
    let closing = format!("</{tag_name}>");
    let separator = separator.to_string();

    LanguageModelMiddleware::new().with_wrap_generate(Arc::new(move |do_generate, _params, _model| {
        let opening = opening.clone();
        let closing = closing.clone();
        let separator = separator.clone();
        Box::pin(async move {
            let mut result = do_generate().await?;

            let mut transformed = Vec::with_capacity(result.content.len());
            for part in result.content.drain(..) {
                match part {
                    Content::Text(text) => {
                        match split_reasoning(&text.text, &opening, &closing, &separator) {
                            Some((cleaned, reasoning)) => {
                                if !cleaned.trim().is_empty() {
                                    transformed.push(Content::Text(Text {
                                        text: cleaned,
                                        provider_metadata: text.provider_metadata.clone(),
                                    }));
                                }
                                if !reasoning.trim().is_empty() {
                                    transformed.push(Content::Reasoning(Reasoning {
                                        text: reasoning,
                                        provider_metadata: text.provider_metadata,
                                    }));
                                }
                            }
                            None => transformed.push(Content::Text(text)),
                        }
                    }
                    other => transformed.push(other),
                }
            }
            result.content = transformed;
            Ok(result)
        })
    }))
}

/// Split a text into (text without spans, extracted reasoning).
///
/// Returns `None` when the text contains no complete span.
fn split_reasoning(
    text: &str,
    opening: &str,
    closing: &str,
    separator: &str,
) -> Option<(String, String)> {
    let mut segments: Vec<&str> = Vec::new();
    let mut spans: Vec<&str> = Vec::new();
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(opening) {
        let start = cursor + found;
        let body_start = start + opening.len();
        let Some(found_close) = text[body_start..].find(closing) else {
            break;
        };
        let body_end = body_start + found_close;

        segments.push(&text[cursor..start]);
        spans.push(&text[body_start..body_end]);
        cursor = body_end + closing.len();
    }

    if spans.is_empty() {
        return None;
    }
    segments.push(&text[cursor..]);

    let mut cleaned = String::new();
    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        if !cleaned.is_empty() {
            cleaned.push_str(separator);
        }
        cleaned.push_str(segment);
    }

    Some((cleaned, spans.join(separator)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::wrap::wrap_language_model;
    use async_trait::async_trait;
    use inferkit_provider::language_model::call_options::CallOptions;
    use inferkit_provider::language_model::finish_reason::FinishReason;
    use inferkit_provider::language_model::prompt::Message;
    use inferkit_provider::language_model::usage::Usage;
    use inferkit_provider::{GenerateResponse, LanguageModel, ProviderError, StreamResponse};

    struct FixedTextModel(&'static str);

    #[async_trait]
    impl LanguageModel for FixedTextModel {
        fn provider(&self) -> &str {
            "fixed"
        }

        fn model_id(&self) -> &str {
            "fixed-1"
        }

        async fn do_generate(&self, _: CallOptions) -> Result<GenerateResponse, ProviderError> {
            Ok(GenerateResponse {
                content: vec![Content::Text(Text::new(self.0))],
                finish_reason: FinishReason::Stop,
                usage: Usage::default(),
                provider_metadata: None,
                request: None,
                response: None,
                warnings: vec![],
            })
        }

        async fn do_stream(&self, _: CallOptions) -> Result<StreamResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doStream", "fixed"))
        }
    }

    async fn run(text: &'static str) -> GenerateResponse {
        let model = wrap_language_model(
            Arc::new(FixedTextModel(text)),
            vec![extract_reasoning_middleware("thinking")],
        );
        model
            .do_generate(CallOptions::new(vec![Message::user("hi")]))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn extracts_a_span_between_text() {
        let result = run("before<thinking>because</thinking>after").await;
        assert_eq!(result.content.len(), 2);
        match (&result.content[0], &result.content[1]) {
            (Content::Text(text), Content::Reasoning(reasoning)) => {
                assert_eq!(text.text, "before\nafter");
                assert_eq!(reasoning.text, "because");
            }
            other => panic!("unexpected content: {other:?}"),
        }
        // No tag survives extraction.
        assert!(!result.text().contains("<thinking>"));
        assert!(!result.text().contains("</thinking>"));
    }

    #[tokio::test]
    async fn joins_multiple_spans() {
        let result = run("<thinking>one</thinking>mid<thinking>two</thinking>").await;
        match (&result.content[0], &result.content[1]) {
            (Content::Text(text), Content::Reasoning(reasoning)) => {
                assert_eq!(text.text, "mid");
                assert_eq!(reasoning.text, "one\ntwo");
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_without_tags_is_untouched() {
        let result = run("plain answer").await;
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.text(), "plain answer");
    }

    #[tokio::test]
    async fn reasoning_only_text_yields_only_reasoning() {
        let result = run("<thinking>all of it</thinking>").await;
        assert_eq!(result.content.len(), 1);
        assert!(matches!(&result.content[0], Content::Reasoning(r) if r.text == "all of it"));
    }
}
