use crate::api_types::{ConverseResponse, ConverseStreamFrame};
use crate::auth::BedrockAuth;
use crate::convert_messages::convert_to_converse_messages;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use inferkit_provider::language_model::call_options::CallOptions;
use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::language_model::content::{Content, Reasoning, Text, ToolCall};
use inferkit_provider::language_model::finish_reason::FinishReason;
use inferkit_provider::language_model::stream_part::StreamPart;
use inferkit_provider::language_model::tool::Tool;
use inferkit_provider::language_model::tool_choice::ToolChoice;
use inferkit_provider::language_model::usage::Usage;
use inferkit_provider::{
    GenerateResponse, LanguageModel, ProviderError, RequestMetadata, StreamResponse,
    StreamResponseMetadata,
};
use inferkit_provider_utils::http::{post_json, post_stream};
use inferkit_provider_utils::provider_options::parse_provider_options;
use inferkit_provider_utils::sse::json_lines;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Configuration for Bedrock models.
#[derive(Clone)]
pub struct BedrockConfig {
    /// Provider name used in errors and metadata.
    pub provider: String,
    /// Base URL, e.g. `https://bedrock-runtime.us-east-1.amazonaws.com`.
    pub base_url: String,
    /// Authentication strategy.
    pub auth: BedrockAuth,
    /// HTTP client, pooled per provider.
    pub client: reqwest::Client,
}

/// Provider options under the `bedrock` namespace.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BedrockOptions {
    /// Provider-native knobs passed through the Converse envelope.
    #[serde(default)]
    additional_model_request_fields: Option<Value>,
}

/// A language model behind the Converse envelope.
pub struct BedrockLanguageModel {
    model_id: String,
    config: BedrockConfig,
}

impl BedrockLanguageModel {
    /// Create a model for the given Bedrock model id.
    pub fn new(model_id: impl Into<String>, config: BedrockConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }

    fn url(&self, operation: &str) -> String {
        format!(
            "{}/model/{}/{operation}",
            self.config.base_url.trim_end_matches('/'),
            self.model_id
        )
    }

    fn prepare_request_body(
        &self,
        options: &CallOptions,
    ) -> Result<(Value, Vec<CallWarning>), ProviderError> {
        let mut warnings = Vec::new();

        for (setting, present) in [
            ("frequencyPenalty", options.frequency_penalty.is_some()),
            ("presencePenalty", options.presence_penalty.is_some()),
            ("seed", options.seed.is_some()),
            ("responseFormat", options.response_format.is_some()),
        ] {
            if present {
                warnings.push(CallWarning::unsupported_setting(setting));
            }
        }

        let converted = convert_to_converse_messages(&options.prompt)?;

        let mut body = json!({ "messages": converted.messages });
        if !converted.system.is_empty() {
            body["system"] = json!(converted.system);
        }

        let mut inference_config = serde_json::Map::new();
        if let Some(max_tokens) = options.max_output_tokens {
            inference_config.insert("maxTokens".into(), json!(max_tokens));
        }
        if let Some(temperature) = options.temperature {
            inference_config.insert("temperature".into(), json!(temperature));
        }
        if let Some(top_p) = options.top_p {
            inference_config.insert("topP".into(), json!(top_p));
        }
        if let Some(stop) = &options.stop_sequences {
            inference_config.insert("stopSequences".into(), json!(stop));
        }
        if !inference_config.is_empty() {
            body["inferenceConfig"] = Value::Object(inference_config);
        }

        if let Some(tools) = &options.tools {
            let mut specs = Vec::new();
            for tool in tools {
                match tool {
                    Tool::Function(function) => specs.push(json!({
                        "toolSpec": {
                            "name": function.name,
                            "description": function.description,
                            "inputSchema": {"json": function.input_schema},
                        }
                    })),
                    Tool::ProviderDefined(tool) => {
                        warnings.push(CallWarning::unsupported_tool(tool.name.clone()));
                    }
                }
            }
            if !specs.is_empty() {
                let mut tool_config = json!({"tools": specs});
                if let Some(choice) = &options.tool_choice {
                    tool_config["toolChoice"] = match choice {
                        ToolChoice::Auto => json!({"auto": {}}),
                        ToolChoice::Required => json!({"any": {}}),
                        ToolChoice::Tool { tool_name } => json!({"tool": {"name": tool_name}}),
                        ToolChoice::None => {
                            warnings.push(CallWarning::unsupported_setting_with_details(
                                "toolChoice",
                                "Converse has no 'none' mode; omit tools instead",
                            ));
                            json!({"auto": {}})
                        }
                    };
                }
                body["toolConfig"] = tool_config;
            }
        }

        let bedrock_options: Option<BedrockOptions> =
            parse_provider_options(options.provider_options.as_ref(), "bedrock")?;
        if let Some(fields) = bedrock_options.and_then(|options| options.additional_model_request_fields)
        {
            body["additionalModelRequestFields"] = fields;
        }

        Ok((body, warnings))
    }

    fn map_stop_reason(reason: Option<&str>) -> FinishReason {
        match reason {
            Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
            Some("max_tokens") => FinishReason::Length,
            Some("tool_use") => FinishReason::ToolCalls,
            Some("content_filtered") | Some("guardrail_intervened") => FinishReason::ContentFilter,
            Some(_) => FinishReason::Other,
            None => FinishReason::Unknown,
        }
    }

    /// Turn the (SSE-style simplified) converse stream into canonical
    /// stream parts.
    fn process_stream(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
        warnings: Vec<CallWarning>,
    ) -> impl Stream<Item = StreamPart> + Send {
        async_stream::stream! {
            yield StreamPart::stream_start(warnings);

            let mut state = StreamState::default();
            let mut frames = Box::pin(json_lines(byte_stream));

            while let Some(frame) = frames.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(err) => {
                        yield StreamPart::error(json!({"message": err.to_string()}));
                        return;
                    }
                };
                let Ok(typed) = serde_json::from_value::<ConverseStreamFrame>(frame) else {
                    continue;
                };
                for part in state.process_frame(typed) {
                    yield part;
                }
            }

            for part in state.finish() {
                yield part;
            }
        }
    }
}

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
    blocks: HashMap<u32, OpenBlock>,
    stop_reason: Option<FinishReason>,
    usage: Usage,
    finished: bool,
}

impl StreamState {
    fn process_frame(&mut self, frame: ConverseStreamFrame) -> Vec<StreamPart> {
        let mut parts = Vec::new();

        if let Some(start) = frame.content_block_start {
            if let Some(tool_use) = start.start.and_then(|payload| payload.tool_use) {
                parts.push(StreamPart::tool_input_start(
                    &tool_use.tool_use_id,
                    &tool_use.name,
                ));
                self.blocks.insert(
                    start.content_block_index,
                    OpenBlock::ToolInput {
                        tool_call_id: tool_use.tool_use_id,
                        tool_name: tool_use.name,
                        arguments: String::new(),
                    },
                );
            }
        }

        if let Some(delta) = frame.content_block_delta {
            let index = delta.content_block_index;
            let id = index.to_string();
            if let Some(payload) = delta.delta {
                if let Some(text) = payload.text {
                    if !self.blocks.contains_key(&index) {
                        self.blocks.insert(index, OpenBlock::Text);
                        parts.push(StreamPart::text_start(&id));
                    }
                    parts.push(StreamPart::text_delta(&id, text));
                } else if let Some(reasoning) = payload.reasoning_content {
                    if !self.blocks.contains_key(&index) {
                        self.blocks.insert(index, OpenBlock::Reasoning);
                        parts.push(StreamPart::reasoning_start(&id));
                    }
                    if let Some(reasoning_text) = reasoning.reasoning_text {
                        parts.push(StreamPart::reasoning_delta(&id, reasoning_text.text));
                    }
                } else if let Some(tool_delta) = payload.tool_use {
                    if let Some(OpenBlock::ToolInput {
                        tool_call_id,
                        arguments,
                        ..
                    }) = self.blocks.get_mut(&index)
                    {
                        arguments.push_str(&tool_delta.input);
                        parts.push(StreamPart::tool_input_delta(
                            tool_call_id.clone(),
                            tool_delta.input,
                        ));
                    }
                }
            }
        }

        if let Some(stop) = frame.content_block_stop {
            let id = stop.content_block_index.to_string();
            match self.blocks.remove(&stop.content_block_index) {
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

        if let Some(stop) = frame.message_stop {
            self.stop_reason = Some(BedrockLanguageModel::map_stop_reason(
                stop.stop_reason.as_deref(),
            ));
        }

        if let Some(metadata) = frame.metadata {
            if let Some(usage) = metadata.usage {
                self.usage = Usage {
                    input_tokens: usage.input_tokens,
                    output_tokens: usage.output_tokens,
                    total_tokens: usage.total_tokens,
                    ..Default::default()
                };
            }
            // Metadata is the final frame of a converse stream.
            parts.extend(self.finish());
        }

        parts
    }

    fn finish(&mut self) -> Vec<StreamPart> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;

        let mut parts = Vec::new();
        let mut indices: Vec<u32> = self.blocks.keys().copied().collect();
        indices.sort_unstable();
        for index in indices {
            let id = index.to_string();
            match self.blocks.remove(&index) {
                Some(OpenBlock::Text) => parts.push(StreamPart::text_end(&id)),
                Some(OpenBlock::Reasoning) => parts.push(StreamPart::reasoning_end(&id)),
                Some(OpenBlock::ToolInput { tool_call_id, .. }) => {
                    parts.push(StreamPart::tool_input_end(tool_call_id));
                }
                None => {}
            }
        }
        parts.push(StreamPart::Finish {
            finish_reason: self.stop_reason.take().unwrap_or(FinishReason::Unknown),
            usage: self.usage,
            provider_metadata: None,
        });
        parts
    }
}

#[async_trait]
impl LanguageModel for BedrockLanguageModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResponse, ProviderError> {
        let (body, warnings) = self.prepare_request_body(&options)?;
        let url = self.url("converse");

        let body_bytes =
            serde_json::to_vec(&body).map_err(|err| ProviderError::model_error(err.to_string()))?;
        let mut headers = self.config.auth.headers("POST", &url, &body_bytes)?;
        if let Some(extra) = &options.headers {
            headers.extend(extra.clone());
        }

        let response = post_json(
            &self.config.client,
            &url,
            &headers,
            &body,
            options.request_timeout,
            options.abort_signal.as_ref(),
        )
        .await?;

        let parsed: ConverseResponse = serde_json::from_value(response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            })?;

        let mut content = Vec::new();
        for block in parsed.output.message.content {
            if let Some(text) = block.text {
                content.push(Content::Text(Text::new(text)));
            } else if let Some(tool_use) = block.tool_use {
                content.push(Content::ToolCall(ToolCall::new(
                    tool_use.tool_use_id,
                    tool_use.name,
                    serde_json::to_string(&tool_use.input).unwrap_or_else(|_| "{}".to_string()),
                )));
            } else if let Some(reasoning) = block.reasoning_content {
                if let Some(reasoning_text) = reasoning.reasoning_text {
                    content.push(Content::Reasoning(Reasoning::new(reasoning_text.text)));
                }
            }
        }

        let usage = parsed
            .usage
            .map(|usage| Usage {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
                total_tokens: usage.total_tokens,
                ..Default::default()
            })
            .unwrap_or_default();

        Ok(GenerateResponse {
            content,
            finish_reason: Self::map_stop_reason(parsed.stop_reason.as_deref()),
            usage,
            provider_metadata: None,
            request: Some(RequestMetadata { body: Some(body) }),
            response: None,
            warnings,
        })
    }

    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError> {
        let (body, warnings) = self.prepare_request_body(&options)?;
        let url = self.url("converse-stream");

        let body_bytes =
            serde_json::to_vec(&body).map_err(|err| ProviderError::model_error(err.to_string()))?;
        let mut headers = self.config.auth.headers("POST", &url, &body_bytes)?;
        if let Some(extra) = &options.headers {
            headers.extend(extra.clone());
        }

        let response = post_stream(
            &self.config.client,
            &url,
            &headers,
            &body,
            options.abort_signal.as_ref(),
        )
        .await?;

        let stream = Self::process_stream(response.bytes, warnings);

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

    fn test_model() -> BedrockLanguageModel {
        BedrockLanguageModel::new(
            "anthropic.claude-3-haiku-20240307-v1:0",
            BedrockConfig {
                provider: "bedrock".into(),
                base_url: "https://bedrock-runtime.us-east-1.amazonaws.com".into(),
                auth: BedrockAuth::Bearer("token".into()),
                client: reqwest::Client::new(),
            },
        )
    }

    #[test]
    fn inference_config_collects_sampling_params() {
        let model = test_model();
        let options = CallOptions::new(vec![Message::system("Short."), Message::user("hi")])
            .with_max_output_tokens(128)
            .with_temperature(0.3);
        let (body, _) = model.prepare_request_body(&options).unwrap();
        assert_eq!(body["inferenceConfig"]["maxTokens"], 128);
        assert_eq!(body["inferenceConfig"]["temperature"], 0.3);
        assert_eq!(body["system"][0]["text"], "Short.");
    }

    #[test]
    fn additional_model_request_fields_pass_through() {
        let model = test_model();
        let mut inner = HashMap::new();
        inner.insert(
            "additionalModelRequestFields".to_string(),
            json!({"top_k": 200}),
        );
        let mut provider_options = HashMap::new();
        provider_options.insert("bedrock".to_string(), inner);
        let options =
            CallOptions::new(vec![Message::user("hi")]).with_provider_options(provider_options);
        let (body, _) = model.prepare_request_body(&options).unwrap();
        assert_eq!(body["additionalModelRequestFields"]["top_k"], 200);
    }

    #[tokio::test]
    async fn stream_frames_produce_the_canonical_sequence() {
        let frames: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from("{\"messageStart\":{\"role\":\"assistant\"}}\n")),
            Ok(Bytes::from(
                "{\"contentBlockDelta\":{\"contentBlockIndex\":0,\"delta\":{\"text\":\"Hi\"}}}\n",
            )),
            Ok(Bytes::from(
                "{\"contentBlockStop\":{\"contentBlockIndex\":0}}\n",
            )),
            Ok(Bytes::from(
                "{\"messageStop\":{\"stopReason\":\"end_turn\"}}\n",
            )),
            Ok(Bytes::from(
                "{\"metadata\":{\"usage\":{\"inputTokens\":3,\"outputTokens\":1,\"totalTokens\":4}}}\n",
            )),
        ];

        let parts: Vec<StreamPart> =
            BedrockLanguageModel::process_stream(stream::iter(frames), Vec::new())
                .collect()
                .await;

        assert!(matches!(parts[1], StreamPart::TextStart { .. }));
        assert_eq!(parts[2].delta(), Some("Hi"));
        assert!(matches!(parts[3], StreamPart::TextEnd { .. }));
        match parts.last().unwrap() {
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
        // Exactly one finish event.
        assert_eq!(parts.iter().filter(|part| part.is_finish()).count(), 1);
    }
}
