use crate::api_types::{
    AnthropicStreamEvent, AnthropicTool, ContentBlockDelta, ContentBlockStart, MessagesResponse,
    ResponseContent,
};
use crate::convert_messages::convert_to_anthropic_messages;
use crate::map_stop_reason::map_anthropic_stop_reason;
use crate::options::AnthropicOptions;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use inferkit_provider::language_model::call_options::{CallOptions, ResponseFormat};
use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::language_model::content::{Content, Reasoning, Text, ToolCall};
use inferkit_provider::language_model::finish_reason::FinishReason;
use inferkit_provider::language_model::response_metadata::ResponseMetadata;
use inferkit_provider::language_model::stream_part::StreamPart;
use inferkit_provider::language_model::tool::Tool;
use inferkit_provider::language_model::tool_choice::ToolChoice;
use inferkit_provider::language_model::usage::Usage;
use inferkit_provider::shared::{Headers, ProviderMetadata};
use inferkit_provider::{
    GenerateResponse, LanguageModel, ProviderError, RequestMetadata, StreamResponse,
    StreamResponseMetadata,
};
use inferkit_provider_utils::http::{post_json, post_stream};
use inferkit_provider_utils::provider_options::parse_provider_options;
use inferkit_provider_utils::sse::sse_events;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

// The Messages API requires max_tokens on every request.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Configuration for the Anthropic Messages language model.
#[derive(Clone)]
pub struct AnthropicConfig {
    /// Provider name used in errors and metadata.
    pub provider: String,
    /// Base URL, e.g. `https://api.anthropic.com/v1`.
    pub base_url: String,
    /// Produces the headers for each request.
    pub headers: Arc<dyn Fn() -> Headers + Send + Sync>,
    /// HTTP client, pooled per provider.
    pub client: reqwest::Client,
}

/// The Anthropic Messages language model.
pub struct AnthropicMessagesLanguageModel {
    model_id: String,
    config: AnthropicConfig,
}

impl AnthropicMessagesLanguageModel {
    /// Create a model for the given Claude model id.
    pub fn new(model_id: impl Into<String>, config: AnthropicConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }

    fn prepare_request_body(
        &self,
        options: &CallOptions,
        stream: bool,
    ) -> Result<(Value, Vec<CallWarning>), ProviderError> {
        let mut warnings = Vec::new();

        for (setting, present) in [
            ("frequencyPenalty", options.frequency_penalty.is_some()),
            ("presencePenalty", options.presence_penalty.is_some()),
            ("seed", options.seed.is_some()),
        ] {
            if present {
                warnings.push(CallWarning::unsupported_setting(setting));
            }
        }
        if let Some(ResponseFormat::Json { .. }) = &options.response_format {
            warnings.push(CallWarning::unsupported_setting_with_details(
                "responseFormat",
                "the Messages API has no JSON mode; constrain output via a tool instead",
            ));
        }

        let converted = convert_to_anthropic_messages(&options.prompt)?;

        let mut body = json!({
            "model": self.model_id,
            "max_tokens": options.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": converted.messages,
        });
        if let Some(system) = converted.system {
            body["system"] = json!(system);
        }
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(top_p) = options.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(top_k) = options.top_k {
            body["top_k"] = json!(top_k);
        }
        if let Some(stop) = &options.stop_sequences {
            body["stop_sequences"] = json!(stop);
        }

        if let Some(tools) = &options.tools {
            let mut wire_tools = Vec::new();
            for tool in tools {
                match tool {
                    Tool::Function(function) => wire_tools.push(AnthropicTool {
                        name: function.name.clone(),
                        description: function.description.clone(),
                        input_schema: function.input_schema.clone(),
                    }),
                    Tool::ProviderDefined(tool) => {
                        warnings.push(CallWarning::unsupported_tool(tool.name.clone()));
                    }
                }
            }
            if !wire_tools.is_empty() {
                body["tools"] = serde_json::to_value(wire_tools)
                    .map_err(|err| ProviderError::model_error(err.to_string()))?;
            }
        }
        if let Some(choice) = &options.tool_choice {
            body["tool_choice"] = match choice {
                ToolChoice::Auto => json!({"type": "auto"}),
                ToolChoice::Required => json!({"type": "any"}),
                ToolChoice::None => json!({"type": "none"}),
                ToolChoice::Tool { tool_name } => json!({"type": "tool", "name": tool_name}),
            };
        }

        let anthropic_options: Option<AnthropicOptions> =
            parse_provider_options(options.provider_options.as_ref(), "anthropic")?;
        if let Some(thinking) = anthropic_options.and_then(|options| options.thinking) {
            body["thinking"] = json!({
                "type": "enabled",
                "budget_tokens": thinking.budget_tokens,
            });
        }

        if stream {
            body["stream"] = json!(true);
        }

        Ok((body, warnings))
    }

    fn request_headers(&self, options: &CallOptions) -> Headers {
        let mut headers = (self.config.headers)();
        if let Some(extra) = &options.headers {
            headers.extend(extra.clone());
        }
        headers
    }

    fn url(&self) -> String {
        format!("{}/messages", self.config.base_url.trim_end_matches('/'))
    }

    /// Turn the typed SSE event stream into canonical stream parts.
    fn process_stream(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
        warnings: Vec<CallWarning>,
        include_raw_chunks: bool,
    ) -> impl Stream<Item = StreamPart> + Send {
        async_stream::stream! {
            yield StreamPart::stream_start(warnings);

            let mut state = StreamState::default();
            let mut events = Box::pin(sse_events(byte_stream));

            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        yield StreamPart::error(json!({"message": err.to_string()}));
                        return;
                    }
                };

                let Ok(parsed) = serde_json::from_str::<Value>(&event.data) else {
                    continue;
                };
                if include_raw_chunks {
                    yield StreamPart::Raw { raw: parsed.clone() };
                }
                let Ok(typed) = serde_json::from_value::<AnthropicStreamEvent>(parsed) else {
                    log::debug!("skipping unrecognised stream event");
                    continue;
                };

                match typed {
                    AnthropicStreamEvent::Error { error } => {
                        yield StreamPart::error(json!({
                            "type": error.kind,
                            "message": error.message,
                        }));
                        return;
                    }
                    other => {
                        for part in state.process_event(other) {
                            yield part;
                        }
                    }
                }
            }
        }
    }
}

/// What kind of block the server opened at an index.
enum OpenBlock {
    Text,
    Reasoning,
    ToolInput {
        tool_call_id: String,
        tool_name: String,
        arguments: String,
    },
}

#[derive(Default)]
struct StreamState {
    // Blocks are keyed by the server-assigned index; the index doubles as
    // the adapter's block id on the emitted events.
    blocks: HashMap<u32, OpenBlock>,
    usage: Usage,
    stop_reason: Option<FinishReason>,
    stop_sequence: Option<String>,
}

impl StreamState {
    fn process_event(&mut self, event: AnthropicStreamEvent) -> Vec<StreamPart> {
        let mut parts = Vec::new();

        match event {
            AnthropicStreamEvent::Ping => {}

            AnthropicStreamEvent::MessageStart { message } => {
                if let Some(usage) = &message.usage {
                    self.usage.input_tokens = usage.input_tokens;
                    self.usage.cached_input_tokens =
                        usage.cache_read_input_tokens.unwrap_or(0);
                }
                parts.push(StreamPart::ResponseMetadata(ResponseMetadata {
                    id: message.id,
                    model_id: message.model,
                    timestamp: None,
                }));
            }

            AnthropicStreamEvent::ContentBlockStart {
                index,
                content_block,
            } => {
                let id = index.to_string();
                match content_block {
                    ContentBlockStart::Text { text } => {
                        self.blocks.insert(index, OpenBlock::Text);
                        parts.push(StreamPart::text_start(&id));
                        if !text.is_empty() {
                            parts.push(StreamPart::text_delta(&id, text));
                        }
                    }
                    ContentBlockStart::Thinking { thinking } => {
                        self.blocks.insert(index, OpenBlock::Reasoning);
                        parts.push(StreamPart::reasoning_start(&id));
                        if !thinking.is_empty() {
                            parts.push(StreamPart::reasoning_delta(&id, thinking));
                        }
                    }
                    ContentBlockStart::RedactedThinking { .. } => {
                        self.blocks.insert(index, OpenBlock::Reasoning);
                        parts.push(StreamPart::reasoning_start(&id));
                    }
                    ContentBlockStart::ToolUse { id: tool_id, name } => {
                        parts.push(StreamPart::tool_input_start(&tool_id, &name));
                        self.blocks.insert(
                            index,
                            OpenBlock::ToolInput {
                                tool_call_id: tool_id,
                                tool_name: name,
                                arguments: String::new(),
                            },
                        );
                    }
                }
            }

            AnthropicStreamEvent::ContentBlockDelta { index, delta } => {
                let id = index.to_string();
                match (self.blocks.get_mut(&index), delta) {
                    (Some(OpenBlock::Text), ContentBlockDelta::TextDelta { text }) => {
                        parts.push(StreamPart::text_delta(&id, text));
                    }
                    (Some(OpenBlock::Reasoning), ContentBlockDelta::ThinkingDelta { thinking }) => {
                        parts.push(StreamPart::reasoning_delta(&id, thinking));
                    }
                    (
                        Some(OpenBlock::ToolInput {
                            tool_call_id,
                            arguments,
                            ..
                        }),
                        ContentBlockDelta::InputJsonDelta { partial_json },
                    ) => {
                        arguments.push_str(&partial_json);
                        parts.push(StreamPart::tool_input_delta(tool_call_id.clone(), partial_json));
                    }
                    // Signature deltas carry no user-visible payload.
                    (_, ContentBlockDelta::SignatureDelta { .. }) => {}
                    (_, _) => log::debug!("delta for unopened block {index}"),
                }
            }

            AnthropicStreamEvent::ContentBlockStop { index } => {
                let id = index.to_string();
                match self.blocks.remove(&index) {
                    Some(OpenBlock::Text) => parts.push(StreamPart::text_end(&id)),
                    Some(OpenBlock::Reasoning) => parts.push(StreamPart::reasoning_end(&id)),
                    Some(OpenBlock::ToolInput {
                        tool_call_id,
                        tool_name,
                        arguments,
                    }) => {
                        parts.push(StreamPart::tool_input_end(&tool_call_id));
                        let input = if arguments.is_empty() {
                            "{}".to_string()
                        } else {
                            arguments
                        };
                        parts.push(StreamPart::ToolCall(ToolCall::new(
                            tool_call_id,
                            tool_name,
                            input,
                        )));
                    }
                    None => {}
                }
            }

            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                if let Some(usage) = usage {
                    self.usage.output_tokens = usage.output_tokens;
                }
                if let Some(reason) = delta.stop_reason.as_deref() {
                    self.stop_reason = Some(map_anthropic_stop_reason(Some(reason)));
                }
                self.stop_sequence = delta.stop_sequence;
            }

            AnthropicStreamEvent::MessageStop => {
                self.usage.total_tokens = self.usage.input_tokens + self.usage.output_tokens;
                let provider_metadata = self.stop_sequence.take().map(|sequence| {
                    let mut inner = HashMap::new();
                    inner.insert("stopSequence".to_string(), json!(sequence));
                    let mut metadata: ProviderMetadata = HashMap::new();
                    metadata.insert("anthropic".to_string(), inner);
                    metadata
                });
                parts.push(StreamPart::Finish {
                    finish_reason: self.stop_reason.take().unwrap_or(FinishReason::Unknown),
                    usage: self.usage,
                    provider_metadata,
                });
            }

            AnthropicStreamEvent::Error { .. } => unreachable!("handled by the caller"),
        }

        parts
    }
}

#[async_trait]
impl LanguageModel for AnthropicMessagesLanguageModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResponse, ProviderError> {
        let (body, warnings) = self.prepare_request_body(&options, false)?;
        let headers = self.request_headers(&options);
        let url = self.url();

        let response = post_json(
            &self.config.client,
            &url,
            &headers,
            &body,
            options.request_timeout,
            options.abort_signal.as_ref(),
        )
        .await?;

        let parsed: MessagesResponse = serde_json::from_value(response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            })?;

        let mut content = Vec::with_capacity(parsed.content.len());
        for block in parsed.content {
            match block {
                ResponseContent::Text { text } => content.push(Content::Text(Text::new(text))),
                ResponseContent::Thinking {
                    thinking,
                    signature,
                } => {
                    let provider_metadata = signature.map(|signature| {
                        let mut inner = HashMap::new();
                        inner.insert("signature".to_string(), json!(signature));
                        let mut metadata: ProviderMetadata = HashMap::new();
                        metadata.insert("anthropic".to_string(), inner);
                        metadata
                    });
                    content.push(Content::Reasoning(Reasoning {
                        text: thinking,
                        provider_metadata,
                    }));
                }
                ResponseContent::RedactedThinking { data } => {
                    let mut inner = HashMap::new();
                    inner.insert("redactedData".to_string(), json!(data));
                    let mut metadata: ProviderMetadata = HashMap::new();
                    metadata.insert("anthropic".to_string(), inner);
                    content.push(Content::Reasoning(Reasoning {
                        text: String::new(),
                        provider_metadata: Some(metadata),
                    }));
                }
                ResponseContent::ToolUse { id, name, input } => {
                    content.push(Content::ToolCall(ToolCall::new(
                        id,
                        name,
                        serde_json::to_string(&input).unwrap_or_else(|_| "{}".to_string()),
                    )));
                }
            }
        }

        let usage = Usage {
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
            total_tokens: parsed.usage.input_tokens + parsed.usage.output_tokens,
            reasoning_tokens: 0,
            cached_input_tokens: parsed.usage.cache_read_input_tokens.unwrap_or(0),
        };

        let mut anthropic_metadata = HashMap::new();
        if let Some(cache_creation) = parsed.usage.cache_creation_input_tokens {
            anthropic_metadata.insert("cacheCreationInputTokens".to_string(), json!(cache_creation));
        }
        if let Some(stop_sequence) = &parsed.stop_sequence {
            anthropic_metadata.insert("stopSequence".to_string(), json!(stop_sequence));
        }
        let provider_metadata = if anthropic_metadata.is_empty() {
            None
        } else {
            let mut metadata: ProviderMetadata = HashMap::new();
            metadata.insert("anthropic".to_string(), anthropic_metadata);
            Some(metadata)
        };

        Ok(GenerateResponse {
            content,
            finish_reason: map_anthropic_stop_reason(parsed.stop_reason.as_deref()),
            usage,
            provider_metadata,
            request: Some(RequestMetadata { body: Some(body) }),
            response: Some(ResponseMetadata {
                id: parsed.id,
                model_id: parsed.model,
                timestamp: None,
            }),
            warnings,
        })
    }

    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError> {
        let (body, warnings) = self.prepare_request_body(&options, true)?;
        let headers = self.request_headers(&options);
        let url = self.url();

        let response = post_stream(
            &self.config.client,
            &url,
            &headers,
            &body,
            options.abort_signal.as_ref(),
        )
        .await?;

        let stream = Self::process_stream(
            response.bytes,
            warnings,
            options.include_raw_chunks.unwrap_or(false),
        );

        Ok(StreamResponse {
            stream: Box::new(Box::pin(stream)),
            request: Some(RequestMetadata { body: Some(body) }),
            response: Some(StreamResponseMetadata {
                headers: Some(response.headers),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use inferkit_provider::language_model::prompt::Message;

    fn test_model() -> AnthropicMessagesLanguageModel {
        AnthropicMessagesLanguageModel::new(
            "claude-3-haiku",
            AnthropicConfig {
                provider: "anthropic".into(),
                base_url: "https://api.anthropic.com/v1".into(),
                headers: Arc::new(Headers::new),
                client: reqwest::Client::new(),
            },
        )
    }

    #[test]
    fn system_and_sampling_params_land_in_the_body() {
        let model = test_model();
        let options = CallOptions::new(vec![Message::system("Be terse."), Message::user("2+2")])
            .with_max_output_tokens(256)
            .with_temperature(0.0)
            .with_top_k(5);
        let (body, warnings) = model.prepare_request_body(&options, false).unwrap();

        assert_eq!(body["system"], "Be terse.");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["top_k"], 5);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn max_tokens_defaults_when_unset() {
        let model = test_model();
        let (body, _) = model
            .prepare_request_body(&CallOptions::new(vec![Message::user("hi")]), false)
            .unwrap();
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn unsupported_settings_warn() {
        let model = test_model();
        let mut options = CallOptions::new(vec![Message::user("hi")]).with_seed(7);
        options.frequency_penalty = Some(0.5);
        let (_, warnings) = model.prepare_request_body(&options, false).unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn thinking_options_pass_through() {
        let model = test_model();
        let mut inner = HashMap::new();
        inner.insert("thinking".to_string(), json!({"budget_tokens": 2048}));
        let mut provider_options = HashMap::new();
        provider_options.insert("anthropic".to_string(), inner);
        let options =
            CallOptions::new(vec![Message::user("hi")]).with_provider_options(provider_options);
        let (body, _) = model.prepare_request_body(&options, false).unwrap();
        assert_eq!(body["thinking"]["type"], "enabled");
        assert_eq!(body["thinking"]["budget_tokens"], 2048);
    }

    #[tokio::test]
    async fn stream_events_map_to_the_canonical_sequence() {
        let frames: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from(
                "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-3-haiku\",\"usage\":{\"input_tokens\":4,\"output_tokens\":0}}}\n\n",
            )),
            Ok(Bytes::from(
                "event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
            )),
            Ok(Bytes::from(
                "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"4\"}}\n\n",
            )),
            Ok(Bytes::from(
                "event: content_block_stop\ndata: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
            )),
            Ok(Bytes::from(
                "event: message_delta\ndata: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":1}}\n\n",
            )),
            Ok(Bytes::from(
                "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            )),
        ];

        let parts: Vec<StreamPart> =
            AnthropicMessagesLanguageModel::process_stream(stream::iter(frames), Vec::new(), false)
                .collect()
                .await;

        let kinds: Vec<&str> = parts
            .iter()
            .map(|part| match part {
                StreamPart::StreamStart { .. } => "stream-start",
                StreamPart::ResponseMetadata(_) => "response-metadata",
                StreamPart::TextStart { .. } => "text-start",
                StreamPart::TextDelta { .. } => "text-delta",
                StreamPart::TextEnd { .. } => "text-end",
                StreamPart::Finish { .. } => "finish",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "stream-start",
                "response-metadata",
                "text-start",
                "text-delta",
                "text-end",
                "finish"
            ]
        );

        match &parts[3] {
            StreamPart::TextDelta { id, delta } => {
                assert_eq!(id, "0");
                assert_eq!(delta, "4");
            }
            other => panic!("expected text delta, got {other:?}"),
        }
        match parts.last().unwrap() {
            StreamPart::Finish {
                finish_reason,
                usage,
                ..
            } => {
                assert_eq!(*finish_reason, FinishReason::Stop);
                assert_eq!(usage.input_tokens, 4);
                assert_eq!(usage.output_tokens, 1);
                assert_eq!(usage.total_tokens, 5);
            }
            other => panic!("expected finish, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn interleaved_tool_blocks_key_by_index() {
        let frames: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from(
                "data: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_1\",\"name\":\"add\"}}\n\n",
            )),
            Ok(Bytes::from(
                "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"a\\\":2,\"}}\n\n",
            )),
            Ok(Bytes::from(
                "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"\\\"b\\\":3}\"}}\n\n",
            )),
            Ok(Bytes::from(
                "data: {\"type\":\"content_block_stop\",\"index\":1}\n\n",
            )),
            Ok(Bytes::from(
                "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"tool_use\"},\"usage\":{\"output_tokens\":9}}\n\n",
            )),
            Ok(Bytes::from("data: {\"type\":\"message_stop\"}\n\n")),
        ];

        let parts: Vec<StreamPart> =
            AnthropicMessagesLanguageModel::process_stream(stream::iter(frames), Vec::new(), false)
                .collect()
                .await;

        let tool_call = parts
            .iter()
            .find_map(|part| match part {
                StreamPart::ToolCall(call) => Some(call),
                _ => None,
            })
            .expect("consolidated tool call");
        assert_eq!(tool_call.tool_call_id, "toolu_1");
        assert_eq!(tool_call.tool_name, "add");
        assert_eq!(tool_call.input, "{\"a\":2,\"b\":3}");

        match parts.last().unwrap() {
            StreamPart::Finish { finish_reason, .. } => {
                assert_eq!(*finish_reason, FinishReason::ToolCalls);
            }
            other => panic!("expected finish, got {other:?}"),
        }
    }
}
