//! Usage telemetry with a pluggable sink.

use crate::middleware::language_model::LanguageModelMiddleware;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// One telemetry record per intercepted call.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    /// Provider name.
    pub provider: String,
    /// Model id.
    pub model: String,
    /// `"generate"` or `"stream"`.
    pub operation: String,
    /// When the call started.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// `"success"` or `"error"`.
    pub status: String,
    /// The error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Input tokens, when the call succeeded and reported usage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    /// Output tokens, when the call succeeded and reported usage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

/// Receives telemetry records. Must not block.
pub type TelemetrySink = Arc<dyn Fn(TelemetryRecord) + Send + Sync>;

/// Middleware that hands one [`TelemetryRecord`] per call to the sink.
///
/// For streams the record covers stream initiation; per-event accounting
/// would require consuming the caller's stream.
pub fn telemetry_middleware(sink: TelemetrySink) -> LanguageModelMiddleware {
    let generate_sink = Arc::clone(&sink);
    let stream_sink = sink;

    LanguageModelMiddleware::new()
        .with_wrap_generate(Arc::new(move |do_generate, _params, model| {
            let sink = Arc::clone(&generate_sink);
            Box::pin(async move {
                let timestamp = Utc::now();
                let started = Instant::now();
                let result = do_generate().await;
                let duration_ms = started.elapsed().as_millis() as u64;

                let record = match &result {
                    Ok(response) => TelemetryRecord {
                        provider: model.provider.clone(),
                        model: model.model_id.clone(),
                        operation: "generate".into(),
                        timestamp,
                        duration_ms,
                        status: "success".into(),
                        error: None,
                        input_tokens: Some(response.usage.input_tokens),
                        output_tokens: Some(response.usage.output_tokens),
                    },
                    Err(err) => TelemetryRecord {
                        provider: model.provider.clone(),
                        model: model.model_id.clone(),
                        operation: "generate".into(),
                        timestamp,
                        duration_ms,
                        status: "error".into(),
                        error: Some(err.to_string()),
                        input_tokens: None,
                        output_tokens: None,
                    },
                };
                sink(record);
                result
            })
        }))
        .with_wrap_stream(Arc::new(move |do_stream, _do_generate, _params, model| {
            let sink = Arc::clone(&stream_sink);
            Box::pin(async move {
                let timestamp = Utc::now();
                let started = Instant::now();
                let result = do_stream().await;
                let duration_ms = started.elapsed().as_millis() as u64;

                let record = TelemetryRecord {
                    provider: model.provider.clone(),
                    model: model.model_id.clone(),
                    operation: "stream".into(),
                    timestamp,
                    duration_ms,
                    status: if result.is_ok() { "success" } else { "error" }.into(),
                    error: result.as_ref().err().map(|err| err.to_string()),
                    input_tokens: None,
                    output_tokens: None,
                };
                sink(record);
                result
            })
        }))
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
    use std::sync::Mutex;

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
                content: vec![],
                finish_reason: FinishReason::Stop,
                usage: Usage::new(7, 3),
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
    async fn records_usage_on_success() {
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink_records = Arc::clone(&records);
        let model = wrap_language_model(
            Arc::new(StaticModel),
            vec![telemetry_middleware(Arc::new(move |record| {
                sink_records.lock().unwrap().push(record);
            }))],
        );

        model
            .do_generate(CallOptions::new(vec![Message::user("hi")]))
            .await
            .unwrap();

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "success");
        assert_eq!(records[0].operation, "generate");
        assert_eq!(records[0].input_tokens, Some(7));
        assert_eq!(records[0].output_tokens, Some(3));
    }
}
