use crate::api_types::{GenerateContentResponse, GoogleResponsePart};
use crate::convert_messages::convert_to_google_contents;
use crate::options::GoogleOptions;
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
use inferkit_provider::shared::Headers;
use inferkit_provider::{
    GenerateResponse, LanguageModel, ProviderError, RequestMetadata, StreamResponse,
    StreamResponseMetadata,
};
use inferkit_provider_utils::http::{post_json, post_stream};
use inferkit_provider_utils::id::generate_id;
use inferkit_provider_utils::provider_options::parse_provider_options;
use inferkit_provider_utils::sse::json_lines;
use serde_json::{Value, json};
use std::sync::Arc;

/// How requests authenticate.
#[derive(Clone)]
pub enum GoogleAuth {
    /// `x-goog-api-key` header (Generative Language API).
    ApiKey(String),
    /// OAuth bearer token minted per request (Vertex AI).
    Token(Arc<dyn crate::vertex::TokenProvider>),
}

/// Configuration shared by both hostings of GenerateContent.
#[derive(Clone)]
pub struct GoogleConfig {
    /// Provider name used in errors and metadata.
    pub provider: String,
    /// Builds the full URL for a model id and RPC name
    /// (`generateContent` / `streamGenerateContent`).
    pub url: Arc<dyn Fn(&str, &str) -> String + Send + Sync>,
    /// Authentication.
    pub auth: GoogleAuth,
    /// Extra headers sent with every request.
    pub extra_headers: Headers,
    /// HTTP client, pooled per provider.
    pub client: reqwest::Client,
}

impl GoogleConfig {
    pub(crate) async fn request_headers(
        &self,
        options_headers: Option<&Headers>,
    ) -> Result<Headers, ProviderError> {
        let mut headers = self.extra_headers.clone();
        match &self.auth {
            GoogleAuth::ApiKey(key) => {
                headers.insert("x-goog-api-key".to_string(), key.clone());
            }
            GoogleAuth::Token(provider) => {
                let token = provider.token().await?;
                headers.insert("authorization".to_string(), format!("Bearer {token}"));
            }
        }
        if let Some(extra) = options_headers {
            headers.extend(extra.clone());
        }
        Ok(headers)
    }
}

/// The GenerateContent language model.
pub struct GoogleLanguageModel {
    model_id: String,
    config: GoogleConfig,
}

impl GoogleLanguageModel {
    /// Create a model for the given Gemini model id.
    pub fn new(model_id: impl Into<String>, config: GoogleConfig) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }

    fn prepare_request_body(
        &self,
        options: &CallOptions,
    ) -> Result<(Value, Vec<CallWarning>), ProviderError> {
        let mut warnings = Vec::new();

        for (setting, present) in [
            ("frequencyPenalty", options.frequency_penalty.is_some()),
            ("presencePenalty", options.presence_penalty.is_some()),
        ] {
            if present {
                warnings.push(CallWarning::unsupported_setting(setting));
            }
        }

        let converted = convert_to_google_contents(&options.prompt)?;

        let mut body = json!({ "contents": converted.contents });
        if let Some(system) = converted.system_instruction {
            body["systemInstruction"] = serde_json::to_value(system)
                .map_err(|err| ProviderError::model_error(err.to_string()))?;
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(max_tokens) = options.max_output_tokens {
            generation_config.insert("maxOutputTokens".into(), json!(max_tokens));
        }
        if let Some(temperature) = options.temperature {
            generation_config.insert("temperature".into(), json!(temperature));
        }
        if let Some(top_p) = options.top_p {
            generation_config.insert("topP".into(), json!(top_p));
        }
        if let Some(top_k) = options.top_k {
            generation_config.insert("topK".into(), json!(top_k));
        }
        if let Some(seed) = options.seed {
            generation_config.insert("seed".into(), json!(seed));
        }
        if let Some(stop) = &options.stop_sequences {
            generation_config.insert("stopSequences".into(), json!(stop));
        }
        if let Some(ResponseFormat::Json { schema, .. }) = &options.response_format {
            generation_config.insert("responseMimeType".into(), json!("application/json"));
            if let Some(schema) = schema {
                generation_config.insert("responseSchema".into(), schema.clone());
            }
        }

        let google_options: Option<GoogleOptions> =
            parse_provider_options(options.provider_options.as_ref(), "google")?;
        if let Some(google_options) = google_options {
            if let Some(safety) = google_options.safety_settings {
                body["safetySettings"] = serde_json::to_value(safety)
                    .map_err(|err| ProviderError::model_error(err.to_string()))?;
            }
            if let Some(thinking) = google_options.thinking_config {
                generation_config.insert(
                    "thinkingConfig".into(),
                    serde_json::to_value(thinking)
                        .map_err(|err| ProviderError::model_error(err.to_string()))?,
                );
            }
        }

        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        if let Some(tools) = &options.tools {
            let mut declarations = Vec::new();
            for tool in tools {
                match tool {
                    Tool::Function(function) => declarations.push(json!({
                        "name": function.name,
                        "description": function.description,
                        "parameters": function.input_schema,
                    })),
                    Tool::ProviderDefined(tool) => {
                        warnings.push(CallWarning::unsupported_tool(tool.name.clone()));
                    }
                }
            }
            if !declarations.is_empty() {
                body["tools"] = json!([{"functionDeclarations": declarations}]);
            }
        }
        if let Some(choice) = &options.tool_choice {
            body["toolConfig"] = match choice {
                ToolChoice::Auto => json!({"functionCallingConfig": {"mode": "AUTO"}}),
                ToolChoice::Required => json!({"functionCallingConfig": {"mode": "ANY"}}),
                ToolChoice::None => json!({"functionCallingConfig": {"mode": "NONE"}}),
                ToolChoice::Tool { tool_name } => json!({
                    "functionCallingConfig": {
                        "mode": "ANY",
                        "allowedFunctionNames": [tool_name],
                    }
                }),
            };
        }

        Ok((body, warnings))
    }

    fn map_finish_reason(reason: Option<&str>) -> FinishReason {
        match reason {
            Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("PROHIBITED_CONTENT")
            | Some("BLOCKLIST") => FinishReason::ContentFilter,
            Some(_) => FinishReason::Other,
            None => FinishReason::Unknown,
        }
    }

    /// Turn the line-delimited JSON stream into canonical stream parts.
    fn process_stream(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
        warnings: Vec<CallWarning>,
        include_raw_chunks: bool,
    ) -> impl Stream<Item = StreamPart> + Send {
        async_stream::stream! {
            yield StreamPart::stream_start(warnings);

            let mut state = StreamState::default();
            let mut chunks = Box::pin(json_lines(byte_stream));

            while let Some(chunk) = chunks.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        yield StreamPart::error(json!({"message": err.to_string()}));
                        return;
                    }
                };
                if include_raw_chunks {
                    yield StreamPart::Raw { raw: chunk.clone() };
                }
                let Ok(parsed) = serde_json::from_value::<GenerateContentResponse>(chunk) else {
                    continue;
                };
                for part in state.process_chunk(parsed) {
                    yield part;
                }
            }

            for part in state.finish() {
                yield part;
            }
        }
    }
}

#[derive(Default)]
struct StreamState {
    text_id: Option<String>,
    reasoning_id: Option<String>,
    finish_reason: Option<FinishReason>,
    usage: Usage,
    emitted_metadata: bool,
}

impl StreamState {
    fn process_chunk(&mut self, chunk: GenerateContentResponse) -> Vec<StreamPart> {
        let mut parts = Vec::new();

        if !self.emitted_metadata
            && (chunk.response_id.is_some() || chunk.model_version.is_some())
        {
            self.emitted_metadata = true;
            parts.push(StreamPart::ResponseMetadata(ResponseMetadata {
                id: chunk.response_id.clone(),
                model_id: chunk.model_version.clone(),
                timestamp: None,
            }));
        }

        if let Some(usage) = &chunk.usage_metadata {
            self.usage = usage.to_usage();
        }

        let Some(candidate) = chunk.candidates.first() else {
            return parts;
        };

        if let Some(content) = &candidate.content {
            for part in &content.parts {
                self.process_part(part, &mut parts);
            }
        }

        if let Some(reason) = candidate.finish_reason.as_deref() {
            self.finish_reason = Some(GoogleLanguageModel::map_finish_reason(Some(reason)));
        }

        parts
    }

    fn process_part(&mut self, part: &GoogleResponsePart, parts: &mut Vec<StreamPart>) {
        if let Some(call) = &part.function_call {
            let id = generate_id("call");
            let input =
                serde_json::to_string(&call.args).unwrap_or_else(|_| "{}".to_string());
            parts.push(StreamPart::tool_input_start(&id, &call.name));
            parts.push(StreamPart::tool_input_delta(&id, &input));
            parts.push(StreamPart::tool_input_end(&id));
            parts.push(StreamPart::ToolCall(ToolCall::new(id, &call.name, input)));
            return;
        }

        let Some(text) = &part.text else { return };
        if text.is_empty() {
            return;
        }

        if part.thought.unwrap_or(false) {
            if self.reasoning_id.is_none() {
                let id = generate_id("reasoning");
                parts.push(StreamPart::reasoning_start(&id));
                self.reasoning_id = Some(id);
            }
            let id = self.reasoning_id.clone().unwrap();
            parts.push(StreamPart::reasoning_delta(id, text));
        } else {
            if self.text_id.is_none() {
                let id = generate_id("text");
                parts.push(StreamPart::text_start(&id));
                self.text_id = Some(id);
            }
            let id = self.text_id.clone().unwrap();
            parts.push(StreamPart::text_delta(id, text));
        }
    }

    fn finish(&mut self) -> Vec<StreamPart> {
        let mut parts = Vec::new();
        if let Some(id) = self.text_id.take() {
            parts.push(StreamPart::text_end(id));
        }
        if let Some(id) = self.reasoning_id.take() {
            parts.push(StreamPart::reasoning_end(id));
        }
        parts.push(StreamPart::Finish {
            finish_reason: self.finish_reason.take().unwrap_or(FinishReason::Unknown),
            usage: self.usage,
            provider_metadata: None,
        });
        parts
    }
}

#[async_trait]
impl LanguageModel for GoogleLanguageModel {
    fn provider(&self) -> &str {
        &self.config.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResponse, ProviderError> {
        let (body, warnings) = self.prepare_request_body(&options)?;
        let url = (self.config.url)(&self.model_id, "generateContent");
        let headers = self.config.request_headers(options.headers.as_ref()).await?;

        let response = post_json(
            &self.config.client,
            &url,
            &headers,
            &body,
            options.request_timeout,
            options.abort_signal.as_ref(),
        )
        .await?;

        let parsed: GenerateContentResponse = serde_json::from_value(response.body.clone())
            .map_err(|err| ProviderError::InvalidResponseData {
                message: err.to_string(),
                data: response.body.to_string(),
            })?;

        let candidate = parsed
            .candidates
            .first()
            .ok_or_else(|| ProviderError::NoContentGenerated {
                message: "response contained no candidates".to_string(),
            })?;

        let mut content = Vec::new();
        if let Some(candidate_content) = &candidate.content {
            for part in &candidate_content.parts {
                if let Some(call) = &part.function_call {
                    content.push(Content::ToolCall(ToolCall::new(
                        generate_id("call"),
                        &call.name,
                        serde_json::to_string(&call.args).unwrap_or_else(|_| "{}".to_string()),
                    )));
                } else if let Some(text) = &part.text {
                    if text.is_empty() {
                        continue;
                    }
                    if part.thought.unwrap_or(false) {
                        content.push(Content::Reasoning(Reasoning::new(text.clone())));
                    } else {
                        content.push(Content::Text(Text::new(text.clone())));
                    }
                }
            }
        }

        Ok(GenerateResponse {
            content,
            finish_reason: Self::map_finish_reason(candidate.finish_reason.as_deref()),
            usage: parsed
                .usage_metadata
                .as_ref()
                .map(|usage| usage.to_usage())
                .unwrap_or_default(),
            provider_metadata: None,
            request: Some(RequestMetadata { body: Some(body) }),
            response: Some(ResponseMetadata {
                id: parsed.response_id,
                model_id: parsed.model_version,
                timestamp: None,
            }),
            warnings,
        })
    }

    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError> {
        let (body, warnings) = self.prepare_request_body(&options)?;
        let url = (self.config.url)(&self.model_id, "streamGenerateContent");
        let headers = self.config.request_headers(options.headers.as_ref()).await?;

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
    use std::collections::HashMap;

    fn test_model() -> GoogleLanguageModel {
        GoogleLanguageModel::new(
            "gemini-2.0-flash",
            GoogleConfig {
                provider: "google.generative-ai".into(),
                url: Arc::new(|model, op| {
                    format!("https://generativelanguage.googleapis.com/v1beta/models/{model}:{op}")
                }),
                auth: GoogleAuth::ApiKey("test-key".into()),
                extra_headers: Headers::new(),
                client: reqwest::Client::new(),
            },
        )
    }

    #[test]
    fn generation_config_collects_sampling_params() {
        let model = test_model();
        let options = CallOptions::new(vec![Message::user("hi")])
            .with_max_output_tokens(100)
            .with_temperature(0.2)
            .with_top_k(40);
        let (body, _) = model.prepare_request_body(&options).unwrap();
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
        assert_eq!(body["generationConfig"]["temperature"], 0.2);
        assert_eq!(body["generationConfig"]["topK"], 40);
    }

    #[test]
    fn json_response_format_sets_mime_and_schema() {
        let model = test_model();
        let options = CallOptions::new(vec![Message::user("hi")]).with_response_format(
            ResponseFormat::json_with_schema(json!({"type": "object"})),
        );
        let (body, _) = model.prepare_request_body(&options).unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "object");
    }

    #[test]
    fn safety_settings_pass_through() {
        let model = test_model();
        let mut inner = HashMap::new();
        inner.insert(
            "safetySettings".to_string(),
            json!([{"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE"}]),
        );
        let mut provider_options = HashMap::new();
        provider_options.insert("google".to_string(), inner);
        let options =
            CallOptions::new(vec![Message::user("hi")]).with_provider_options(provider_options);
        let (body, _) = model.prepare_request_body(&options).unwrap();
        assert_eq!(
            body["safetySettings"][0]["category"],
            "HARM_CATEGORY_HARASSMENT"
        );
    }

    #[tokio::test]
    async fn ndjson_stream_yields_text_and_finish() {
        let frames: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from(
                "{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Once\"}]}}],\"responseId\":\"r1\",\"modelVersion\":\"gemini-2.0-flash\"}\n",
            )),
            Ok(Bytes::from(
                "{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" upon\"}]},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"promptTokenCount\":3,\"candidatesTokenCount\":2,\"totalTokenCount\":5}}\n",
            )),
        ];

        let parts: Vec<StreamPart> =
            GoogleLanguageModel::process_stream(stream::iter(frames), Vec::new(), false)
                .collect()
                .await;

        let text: String = parts
            .iter()
            .filter_map(|part| match part {
                StreamPart::TextDelta { delta, .. } => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Once upon");

        match parts.last().unwrap() {
            StreamPart::Finish {
                finish_reason,
                usage,
                ..
            } => {
                assert_eq!(*finish_reason, FinishReason::Stop);
                assert_eq!(usage.total_tokens, 5);
            }
            other => panic!("expected finish, got {other:?}"),
        }
    }

    #[test]
    fn safety_finish_reasons_map_to_content_filter() {
        assert_eq!(
            GoogleLanguageModel::map_finish_reason(Some("SAFETY")),
            FinishReason::ContentFilter
        );
        assert_eq!(
            GoogleLanguageModel::map_finish_reason(Some("RECITATION")),
            FinishReason::ContentFilter
        );
    }
}
