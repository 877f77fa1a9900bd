//! Streaming text generation.

use crate::generate_text::GenerateTextResult;
use crate::prompt::validate_prompt;
use futures_util::{Stream, StreamExt};
use inferkit_provider::language_model::call_options::CallOptions;
use inferkit_provider::language_model::content::{Content, Reasoning, Text};
use inferkit_provider::language_model::finish_reason::FinishReason;
use inferkit_provider::language_model::response_metadata::ResponseMetadata;
use inferkit_provider::language_model::stream_part::StreamPart;
use inferkit_provider::language_model::usage::Usage;
use inferkit_provider::{LanguageModel, ProviderError, RequestMetadata, StreamResponseMetadata};
use std::collections::HashMap;
use std::sync::Arc;

/// Stream text with the given model.
///
/// Returns as soon as the stream is open; events arrive lazily as the
/// caller consumes [`StreamTextResult::stream`].
pub async fn stream_text(
    model: &Arc<dyn LanguageModel>,
    options: CallOptions,
) -> Result<StreamTextResult, ProviderError> {
    validate_prompt(&options.prompt)?;
    let response = model.do_stream(options).await?;
    Ok(StreamTextResult {
        stream: response.stream,
        request: response.request,
        response: response.response,
    })
}

/// Result of a streaming generation.
///
/// Owns the single-consumer event stream. The caller either drains the
/// stream event by event or calls [`collect`](StreamTextResult::collect) to
/// reassemble a final result.
pub struct StreamTextResult {
    /// The event stream.
    pub stream: Box<dyn Stream<Item = StreamPart> + Unpin + Send>,
    /// Echo of the request that was sent.
    pub request: Option<RequestMetadata>,
    /// Metadata available when the stream was opened.
    pub response: Option<StreamResponseMetadata>,
}

impl StreamTextResult {
    /// Consume the stream and return the next event, or `None` at the end.
    pub async fn next(&mut self) -> Option<StreamPart> {
        self.stream.next().await
    }

    /// Drain the stream and reassemble the equivalent non-streaming result.
    ///
    /// Deltas are grouped by block id in block-open order, so concatenating
    /// a block's deltas reconstructs its payload regardless of how blocks
    /// interleaved. A mid-stream error event fails the collection.
    pub async fn collect(mut self) -> Result<GenerateTextResult, ProviderError> {
        struct Block {
            kind: BlockKind,
            text: String,
        }
        enum BlockKind {
            Text,
            Reasoning,
        }

        let mut order: Vec<(usize, String)> = Vec::new();
        let mut blocks: HashMap<String, Block> = HashMap::new();
        let mut late_content: Vec<(usize, Content)> = Vec::new();
        let mut position = 0usize;
        let mut finish_reason = FinishReason::Unknown;
        let mut usage = Usage::default();
        let mut provider_metadata = None;
        let mut response_metadata: Option<ResponseMetadata> = None;
        let mut warnings = Vec::new();

        while let Some(part) = self.stream.next().await {
            match part {
                StreamPart::StreamStart { warnings: w } => warnings = w,
                StreamPart::ResponseMetadata(metadata) => response_metadata = Some(metadata),
                StreamPart::TextStart { id } => {
                    order.push((position, id.clone()));
                    position += 1;
                    blocks.insert(
                        id,
                        Block {
                            kind: BlockKind::Text,
                            text: String::new(),
                        },
                    );
                }
                StreamPart::ReasoningStart { id, .. } => {
                    order.push((position, id.clone()));
                    position += 1;
                    blocks.insert(
                        id,
                        Block {
                            kind: BlockKind::Reasoning,
                            text: String::new(),
                        },
                    );
                }
                StreamPart::TextDelta { id, delta } | StreamPart::ReasoningDelta { id, delta } => {
                    if let Some(block) = blocks.get_mut(&id) {
                        block.text.push_str(&delta);
                    }
                }
                StreamPart::TextEnd { .. } | StreamPart::ReasoningEnd { .. } => {}
                StreamPart::ToolInputStart { .. }
                | StreamPart::ToolInputDelta { .. }
                | StreamPart::ToolInputEnd { .. } => {}
                StreamPart::ToolCall(call) => {
                    late_content.push((position, Content::ToolCall(call)));
                    position += 1;
                }
                StreamPart::Source(source) => {
                    late_content.push((position, Content::Source(source)));
                    position += 1;
                }
                StreamPart::File(file) => {
                    late_content.push((position, Content::File(file)));
                    position += 1;
                }
                StreamPart::Finish {
                    finish_reason: reason,
                    usage: final_usage,
                    provider_metadata: metadata,
                } => {
                    finish_reason = reason;
                    usage = final_usage;
                    provider_metadata = metadata;
                }
                StreamPart::Raw { .. } => {}
                StreamPart::Error { error } => {
                    return Err(ProviderError::model_error(format!(
                        "stream failed: {error}"
                    )));
                }
            }
        }

        // Merge block content and non-block content back into one ordered list.
        let mut content: Vec<Content> = Vec::new();
        let mut late = late_content.into_iter().peekable();
        for (slot, id) in &order {
            while let Some((at, _)) = late.peek() {
                if at <= slot {
                    content.push(late.next().unwrap().1);
                } else {
                    break;
                }
            }
            if let Some(block) = blocks.remove(id) {
                match block.kind {
                    BlockKind::Text => content.push(Content::Text(Text::new(block.text))),
                    BlockKind::Reasoning => {
                        content.push(Content::Reasoning(Reasoning::new(block.text)))
                    }
                }
            }
        }
        content.extend(late.map(|(_, part)| part));

        Ok(GenerateTextResult {
            content,
            finish_reason,
            usage,
            warnings,
            provider_metadata,
            request: self.request,
            response: response_metadata,
        })
    }
}
