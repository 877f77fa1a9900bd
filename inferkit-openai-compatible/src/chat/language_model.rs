use crate::chat::api_types::{ChatResponse, ChatStreamChunk};
use crate::chat::convert_messages::convert_to_openai_compatible_messages;
use crate::chat::map_finish_reason::map_openai_compatible_finish_reason;
use crate::chat::metadata_extractor::StreamMetadataExtractor;
use crate::chat::prepare_tools::prepare_tools;
use crate::settings::OpenAICompatibleConfig;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use inferkit_provider::language_model::call_options::{CallOptions, ResponseFormat};
use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::language_model::content::{Content, Reasoning, Text, ToolCall};
use inferkit_provider::language_model::finish_reason::FinishReason;
use inferkit_provider::language_model::response_metadata::ResponseMetadata;
use inferkit_provider::language_model::stream_part::StreamPart;
use inferkit_provider::language_model::usage::Usage;
use inferkit_provider::{
    GenerateResponse, LanguageModel, ProviderError, RequestMetadata, StreamResponse,
    StreamResponseMetadata,
};
use inferkit_provider_utils::http::{post_json, post_stream};
use inferkit_provider_utils::id::generate_id;
use inferkit_provider_utils::sse::lines;
use serde_json::{Value, json};
use std::collections::HashMap;

/// A chat-completions language model.
///
/// One implementation serves every OpenAI-compatible service; the
/// [`OpenAICompatibleConfig`] carries the provider-specific base URL,
/// credentials and quirks.
pub struct ChatLanguageModel {
    model_id: String,
    config: OpenAICompatibleConfig,
}

impl ChatLanguageModel {
    /// Create a chat model for the given model id.
    pub fn new(model_id: impl Into<String>, config: OpenAICompatibleConfig) -> Self {
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

        if options.top_k.is_some() {
            warnings.push(CallWarning::unsupported_setting("topK"));
        }

        let messages = convert_to_openai_compatible_messages(&options.prompt)?;
        let mut body = json!({
            "model": self.model_id,
            "messages": messages,
        });

        if let Some(max_tokens) = options.max_output_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(top_p) = options.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(frequency_penalty) = options.frequency_penalty {
            body["frequency_penalty"] = json!(frequency_penalty);
        }
        if let Some(presence_penalty) = options.presence_penalty {
            body["presence_penalty"] = json!(presence_penalty);
        }
        if let Some(seed) = options.seed {
            body["seed"] = json!(seed);
        }
        if let Some(stop) = &options.stop_sequences {
            body["stop"] = json!(stop);
        }

        match &options.response_format {
            None | Some(ResponseFormat::Text) => {}
            Some(ResponseFormat::Json {
                schema: Some(schema),
                name,
                description,
            }) if self.config.supports_structured_outputs => {
                let mut json_schema = json!({
                    "name": name.clone().unwrap_or_else(|| "response".to_string()),
                    "schema": schema,
                    "strict": true,
                });
                if let Some(description) = description {
                    json_schema["description"] = json!(description);
                }
                body["response_format"] = json!({
                    "type": "json_schema",
                    "json_schema": json_schema,
                });
            }
            Some(ResponseFormat::Json { schema, .. }) => {
                if schema.is_some() {
                    warnings.push(CallWarning::unsupported_setting_with_details(
                        "responseFormat",
                        "JSON schema enforcement is not supported; using json_object mode",
                    ));
                }
                body["response_format"] = json!({"type": "json_object"});
            }
        }

        let prepared = prepare_tools(options.tools.as_deref(), options.tool_choice.as_ref());
        warnings.extend(prepared.warnings);
        if let Some(tools) = prepared.tools {
            body["tools"] = serde_json::to_value(tools)
                .map_err(|err| ProviderError::model_error(err.to_string()))?;
        }
        if let Some(tool_choice) = prepared.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        // Provider-specific knobs pass straight through into the body root.
        if let Some(extras) = options
            .provider_options
            .as_ref()
            .and_then(|options| options.get(self.config.provider_options_name()))
        {
            for (key, value) in extras {
                body[key] = value.clone();
            }
        }

        if stream {
            body["stream"] = json!(true);
            if self.config.include_usage {
                body["stream_options"] = json!({"include_usage": true});
            }
        }

        if let Some(transform) = &self.config.transform_request_body {
            body = transform(body);
        }

        Ok((body, warnings))
    }

    fn request_headers(&self, options: &CallOptions) -> HashMap<String, String> {
        let mut headers = (self.config.headers)();
        if let Some(extra) = &options.headers {
            headers.extend(extra.clone());
        }
        headers
    }

    /// Turn the SSE byte stream into canonical stream parts.
    fn process_stream(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
        warnings: Vec<CallWarning>,
        mut metadata_extractor: Option<Box<dyn StreamMetadataExtractor>>,
        include_raw_chunks: bool,
    ) -> impl Stream<Item = StreamPart> + Send {
        async_stream::stream! {
            yield StreamPart::stream_start(warnings);

            let mut state = StreamState::default();
            let mut line_stream = Box::pin(lines(byte_stream));

            while let Some(line) = line_stream.next().await {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        yield StreamPart::error(json!({"message": err.to_string()}));
                        return;
                    }
                };

                let Some(data) = line.strip_prefix("data: ").or(line.strip_prefix("data:")) else {
                    continue;
                };
                if data == "[DONE]" {
                    break;
                }

                let Ok(parsed) = serde_json::from_str::<Value>(data) else {
                    log::debug!("skipping undecodable chunk");
                    continue;
                };

                if include_raw_chunks {
                    yield StreamPart::Raw { raw: parsed.clone() };
                }
                if let Some(extractor) = metadata_extractor.as_mut() {
                    extractor.process_chunk(&parsed);
                }

                let Ok(chunk) = serde_json::from_value::<ChatStreamChunk>(parsed) else {
                    continue;
                };
                for part in state.process_chunk(chunk) {
                    yield part;
                }
            }

            for part in state.finish(metadata_extractor.as_deref()) {
                yield part;
            }
        }
    }
}

#[derive(Default)]
struct StreamState {
    text_id: Option<String>,
    reasoning_id: Option<String>,
    // Tool-call fragments accumulate keyed by the position in the delta's
    // tool_calls array; ids may be absent on continuation deltas.
    tool_calls: HashMap<usize, ToolCallState>,
    finish_reason: Option<FinishReason>,
    usage: Usage,
    emitted_metadata: bool,
}

struct ToolCallState {
    id: String,
    name: String,
    arguments: String,
    started: bool,
    closed: bool,
}

impl StreamState {
    fn process_chunk(&mut self, chunk: ChatStreamChunk) -> Vec<StreamPart> {
        let mut parts = Vec::new();

        if !self.emitted_metadata
            && (chunk.id.is_some() || chunk.model.is_some() || chunk.created.is_some())
        {
            self.emitted_metadata = true;
            parts.push(StreamPart::ResponseMetadata(ResponseMetadata::from_parts(
                chunk.id.clone(),
                chunk.model.clone(),
                chunk.created,
            )));
        }

        if let Some(usage) = &chunk.usage {
            self.usage = usage.to_usage();
        }

        let Some(choice) = chunk.choices.first() else {
            return parts;
        };
        let delta = &choice.delta;

        if let Some(content) = &delta.content {
            if !content.is_empty() {
                if self.text_id.is_none() {
                    let id = generate_id("text");
                    parts.push(StreamPart::text_start(&id));
                    self.text_id = Some(id);
                }
                let id = self.text_id.clone().unwrap();
                parts.push(StreamPart::text_delta(id, content));
            }
        }

        let reasoning = delta
            .reasoning_content
            .as_deref()
            .or(delta.reasoning.as_deref());
        if let Some(reasoning) = reasoning {
            if !reasoning.is_empty() {
                if self.reasoning_id.is_none() {
                    let id = generate_id("reasoning");
                    parts.push(StreamPart::reasoning_start(&id));
                    self.reasoning_id = Some(id);
                }
                let id = self.reasoning_id.clone().unwrap();
                parts.push(StreamPart::reasoning_delta(id, reasoning));
            }
        }

        if let Some(tool_calls) = &delta.tool_calls {
            for tool_call in tool_calls {
                let index = tool_call.index.unwrap_or(0) as usize;

                if !self.tool_calls.contains_key(&index) {
                    if let Some(id) = &tool_call.id {
                        self.tool_calls.insert(
                            index,
                            ToolCallState {
                                id: id.clone(),
                                name: String::new(),
                                arguments: String::new(),
                                started: false,
                                closed: false,
                            },
                        );
                    }
                }

                let Some(entry) = self.tool_calls.get_mut(&index) else {
                    continue;
                };
                let Some(function) = &tool_call.function else {
                    continue;
                };

                if let Some(name) = &function.name {
                    if !name.is_empty() {
                        entry.name = name.clone();
                    }
                }

                if !entry.started && !entry.id.is_empty() && !entry.name.is_empty() {
                    entry.started = true;
                    parts.push(StreamPart::tool_input_start(&entry.id, &entry.name));
                }

                if let Some(arguments) = &function.arguments {
                    if !arguments.is_empty() {
                        entry.arguments.push_str(arguments);
                        if entry.started {
                            parts.push(StreamPart::tool_input_delta(&entry.id, arguments));
                        }
                    }
                }
            }
        }

        if let Some(finish_reason) = &choice.finish_reason {
            parts.extend(self.close_blocks());
            self.finish_reason = Some(map_openai_compatible_finish_reason(Some(finish_reason)));
        }

        parts
    }

    fn close_blocks(&mut self) -> Vec<StreamPart> {
        let mut parts = Vec::new();

        if let Some(id) = self.text_id.take() {
            parts.push(StreamPart::text_end(id));
        }
        if let Some(id) = self.reasoning_id.take() {
            parts.push(StreamPart::reasoning_end(id));
        }

        let mut indices: Vec<usize> = self.tool_calls.keys().copied().collect();
        indices.sort_unstable();
        for index in indices {
            let entry = self.tool_calls.get_mut(&index).unwrap();
            if entry.started && !entry.closed {
                entry.closed = true;
                parts.push(StreamPart::tool_input_end(&entry.id));
                parts.push(StreamPart::ToolCall(ToolCall::new(
                    &entry.id,
                    &entry.name,
                    &entry.arguments,
                )));
            }
        }

        parts
    }

    /// Terminal events once the stream has ended. A stream that never
    /// reported a finish reason still gets exactly one finish event, with
    /// reason unknown.
    fn finish(&mut self, metadata_extractor: Option<&dyn StreamMetadataExtractor>) -> Vec<StreamPart> {
        let mut parts = self.close_blocks();
        parts.push(StreamPart::Finish {
            finish_reason: self.finish_reason.take().unwrap_or(FinishReason::Unknown),
            usage: self.usage,
            provider_metadata: metadata_extractor.and_then(|extractor| extractor.build_metadata()),
        });
        parts
    }
}

#[async_trait]
impl LanguageModel for ChatLanguageModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResponse, ProviderError> {
        let (body, warnings) = self.prepare_request_body(&options, false)?;
        let url = (self.config.url)("/chat/completions");
        let headers = self.request_headers(&options);

        let response = post_json(
            &self.config.client,
            &url,
            &headers,
            &body,
            options.request_timeout,
            options.abort_signal.as_ref(),
        )
        .await?;

        let parsed: ChatResponse = serde_json::from_value(response.body.clone()).map_err(|err| {
            ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            }
        })?;

        let choice = parsed
            .choices
            .first()
            .ok_or_else(|| ProviderError::NoContentGenerated {
                message: "response contained no choices".to_string(),
            })?;

        let mut content = Vec::new();
        if let Some(text) = &choice.message.content {
            if !text.is_empty() {
                content.push(Content::Text(Text::new(text.clone())));
            }
        }
        let reasoning = choice
            .message
            .reasoning_content
            .as_deref()
            .or(choice.message.reasoning.as_deref());
        if let Some(reasoning) = reasoning {
            if !reasoning.is_empty() {
                content.push(Content::Reasoning(Reasoning::new(reasoning)));
            }
        }
        if let Some(tool_calls) = &choice.message.tool_calls {
            for tool_call in tool_calls {
                content.push(Content::ToolCall(ToolCall::new(
                    tool_call
                        .id
                        .clone()
                        .unwrap_or_else(|| generate_id("call")),
                    tool_call.function.name.clone(),
                    tool_call.function.arguments.clone(),
                )));
            }
        }

        let usage = parsed
            .usage
            .as_ref()
            .map(|usage| usage.to_usage())
            .unwrap_or_default();

        let provider_metadata = self
            .config
            .metadata_extractor
            .as_ref()
            .and_then(|extractor| extractor.extract_metadata(&response.body));

        Ok(GenerateResponse {
            content,
            finish_reason: map_openai_compatible_finish_reason(choice.finish_reason.as_deref()),
            usage,
            provider_metadata,
            request: Some(RequestMetadata { body: Some(body) }),
            response: Some(ResponseMetadata::from_parts(
                parsed.id,
                parsed.model,
                parsed.created,
            )),
            warnings,
        })
    }

    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError> {
        let (body, warnings) = self.prepare_request_body(&options, true)?;
        let url = (self.config.url)("/chat/completions");
        let headers = self.request_headers(&options);

        let response = post_stream(
            &self.config.client,
            &url,
            &headers,
            &body,
            options.abort_signal.as_ref(),
        )
        .await?;

        let stream_extractor = self
            .config
            .metadata_extractor
            .as_ref()
            .map(|extractor| extractor.create_stream_extractor());

        let stream = Self::process_stream(
            response.bytes,
            warnings,
            stream_extractor,
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
    use std::sync::Arc;

    fn test_model() -> ChatLanguageModel {
        let config = OpenAICompatibleConfig::new(
            "test-provider",
            "https://api.test.com/v1",
            Arc::new(HashMap::new),
        );
        ChatLanguageModel::new("test-model", config)
    }

    fn chunk(data: &str) -> ChatStreamChunk {
        serde_json::from_str(data).unwrap()
    }

    #[test]
    fn request_body_includes_sampling_params() {
        let model = test_model();
        let options = CallOptions::new(vec![Message::user("Say hi")])
            .with_max_output_tokens(100)
            .with_temperature(0.0)
            .with_seed(42)
            .with_stop_sequences(vec!["END".into()]);
        let (body, warnings) = model.prepare_request_body(&options, false).unwrap();

        assert_eq!(body["model"], "test-model");
        assert_eq!(body["max_tokens"], 100);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["seed"], 42);
        assert_eq!(body["stop"][0], "END");
        assert!(body.get("stream").is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn top_k_is_dropped_with_warning() {
        let model = test_model();
        let options = CallOptions::new(vec![Message::user("hi")]).with_top_k(40);
        let (body, warnings) = model.prepare_request_body(&options, false).unwrap();
        assert!(body.get("top_k").is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn json_schema_falls_back_without_structured_outputs() {
        let model = test_model();
        let options = CallOptions::new(vec![Message::user("hi")]).with_response_format(
            ResponseFormat::json_with_schema(json!({"type": "object"})),
        );
        let (body, warnings) = model.prepare_request_body(&options, false).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn json_schema_is_sent_when_supported() {
        let config = OpenAICompatibleConfig::new(
            "test-provider",
            "https://api.test.com/v1",
            Arc::new(HashMap::new),
        )
        .with_structured_outputs(true);
        let model = ChatLanguageModel::new("test-model", config);
        let options = CallOptions::new(vec![Message::user("hi")]).with_response_format(
            ResponseFormat::json_with_schema(json!({"type": "object"})),
        );
        let (body, warnings) = model.prepare_request_body(&options, false).unwrap();
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert!(warnings.is_empty());
    }

    #[test]
    fn provider_extras_merge_into_body_root() {
        let model = test_model();
        let mut extras = HashMap::new();
        extras.insert("safe_prompt".to_string(), json!(true));
        let mut provider_options = HashMap::new();
        provider_options.insert("test-provider".to_string(), extras);
        let options =
            CallOptions::new(vec![Message::user("hi")]).with_provider_options(provider_options);
        let (body, _) = model.prepare_request_body(&options, false).unwrap();
        assert_eq!(body["safe_prompt"], true);
    }

    #[test]
    fn stream_body_requests_usage() {
        let model = test_model();
        let options = CallOptions::new(vec![Message::user("hi")]);
        let (body, _) = model.prepare_request_body(&options, true).unwrap();
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
    }

    #[test]
    fn text_deltas_share_one_block() {
        let mut state = StreamState::default();
        let parts = state.process_chunk(chunk(
            r#"{"id":"c1","model":"m","created":1,"choices":[{"delta":{"content":"Hel"}}]}"#,
        ));
        assert!(matches!(parts[0], StreamPart::ResponseMetadata(_)));
        assert!(matches!(parts[1], StreamPart::TextStart { .. }));
        assert_eq!(parts[2].delta(), Some("Hel"));

        let more = state.process_chunk(chunk(
            r#"{"choices":[{"delta":{"content":"lo"}}]}"#,
        ));
        assert_eq!(more.len(), 1);
        assert_eq!(more[0].delta(), Some("lo"));
        assert_eq!(more[0].id(), parts[1].id());
    }

    #[test]
    fn finish_waits_for_stream_end() {
        let mut state = StreamState::default();
        state.process_chunk(chunk(r#"{"choices":[{"delta":{"content":"4"}}]}"#));
        let closing = state.process_chunk(chunk(
            r#"{"choices":[{"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#,
        ));
        // The finish_reason chunk closes the text block but holds the finish
        // event until the stream actually ends.
        assert!(matches!(closing.last(), Some(StreamPart::TextEnd { .. })));

        let terminal = state.finish(None);
        assert_eq!(terminal.len(), 1);
        match &terminal[0] {
            StreamPart::Finish {
                finish_reason,
                usage,
                ..
            } => {
                assert_eq!(*finish_reason, FinishReason::Stop);
                assert_eq!(usage.total_tokens, 4);
            }
            other => panic!("expected finish, got {other:?}"),
        }
    }

    #[test]
    fn done_without_finish_reason_synthesises_unknown() {
        let mut state = StreamState::default();
        state.process_chunk(chunk(r#"{"choices":[{"delta":{"content":"hi"}}]}"#));
        let terminal = state.finish(None);
        // Open text block is closed before the synthetic finish.
        assert!(matches!(terminal[0], StreamPart::TextEnd { .. }));
        match &terminal[1] {
            StreamPart::Finish { finish_reason, .. } => {
                assert_eq!(*finish_reason, FinishReason::Unknown);
            }
            other => panic!("expected finish, got {other:?}"),
        }
    }

    #[test]
    fn tool_call_fragments_accumulate_by_index() {
        let mut state = StreamState::default();
        let first = state.process_chunk(chunk(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_1","function":{"name":"add","arguments":"{\"a\""}}]}}]}"#,
        ));
        assert!(matches!(first[0], StreamPart::ToolInputStart { .. }));
        assert_eq!(first[1].delta(), Some("{\"a\""));

        // Continuation delta carries no id; the index keys the accumulation.
        let second = state.process_chunk(chunk(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":":2}"}}]}}]}"#,
        ));
        assert_eq!(second[0].delta(), Some(":2}"));

        let closing = state.process_chunk(chunk(
            r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#,
        ));
        assert!(matches!(closing[0], StreamPart::ToolInputEnd { .. }));
        match &closing[1] {
            StreamPart::ToolCall(call) => {
                assert_eq!(call.tool_call_id, "call_1");
                assert_eq!(call.tool_name, "add");
                assert_eq!(call.input, "{\"a\":2}");
            }
            other => panic!("expected tool call, got {other:?}"),
        }

        let terminal = state.finish(None);
        match &terminal[0] {
            StreamPart::Finish { finish_reason, .. } => {
                assert_eq!(*finish_reason, FinishReason::ToolCalls);
            }
            other => panic!("expected finish, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn process_stream_emits_canonical_sequence() {
        let frames: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from(
                "data: {\"id\":\"c1\",\"model\":\"m\",\"created\":1,\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            )),
            Ok(Bytes::from(
                "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}],\"usage\":{\"prompt_tokens\":3,\"completion_tokens\":1,\"total_tokens\":4}}\n\n",
            )),
            Ok(Bytes::from("data: [DONE]\n\n")),
        ];
        let parts: Vec<StreamPart> =
            ChatLanguageModel::process_stream(stream::iter(frames), Vec::new(), None, false)
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
        assert!(parts.last().unwrap().is_finish());
    }
}
