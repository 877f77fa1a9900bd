use crate::middleware::language_model::{
    DoGenerate, DoStream, LanguageModelMiddleware, ModelInfo, OperationType,
};
use async_trait::async_trait;
use inferkit_provider::language_model::call_options::CallOptions;
use inferkit_provider::{GenerateResponse, LanguageModel, ProviderError, StreamResponse};
use std::sync::Arc;

/// Apply a middleware chain to a language model.
///
/// An empty chain returns the original model unchanged (same `Arc`), so
/// wrapping with no middleware is observationally the identity.
pub fn wrap_language_model(
    model: Arc<dyn LanguageModel>,
    middleware: Vec<LanguageModelMiddleware>,
) -> Arc<dyn LanguageModel> {
    if middleware.is_empty() {
        return model;
    }

    // The last middleware carrying an override wins, matching the reverse
    // scan order used for wrapping.
    let mut provider = model.provider().to_string();
    let mut model_id = model.model_id().to_string();
    for entry in middleware.iter().rev() {
        if let Some(override_provider) = &entry.override_provider {
            provider = override_provider(model.provider());
            break;
        }
    }
    for entry in middleware.iter().rev() {
        if let Some(override_model_id) = &entry.override_model_id {
            model_id = override_model_id(model.model_id());
            break;
        }
    }

    Arc::new(WrappedLanguageModel {
        model,
        middleware,
        provider,
        model_id,
    })
}

/// A language model with a middleware chain applied.
struct WrappedLanguageModel {
    model: Arc<dyn LanguageModel>,
    middleware: Vec<LanguageModelMiddleware>,
    provider: String,
    model_id: String,
}

impl WrappedLanguageModel {
    fn info(&self) -> ModelInfo {
        ModelInfo {
            provider: self.model.provider().to_string(),
            model_id: self.model.model_id().to_string(),
        }
    }

    async fn transform_params(
        &self,
        mut params: CallOptions,
        operation: OperationType,
    ) -> Result<CallOptions, ProviderError> {
        let info = self.info();
        for middleware in &self.middleware {
            if let Some(transform) = &middleware.transform_params {
                params = transform(params, operation, info.clone()).await?;
            }
        }
        Ok(params)
    }

    fn base_generate(&self, params: &CallOptions) -> DoGenerate {
        let model = Arc::clone(&self.model);
        let params = params.clone();
        Arc::new(move || {
            let model = Arc::clone(&model);
            let params = params.clone();
            Box::pin(async move { model.do_generate(params).await })
        })
    }

    fn base_stream(&self, params: &CallOptions) -> DoStream {
        let model = Arc::clone(&self.model);
        let params = params.clone();
        Arc::new(move || {
            let model = Arc::clone(&model);
            let params = params.clone();
            Box::pin(async move { model.do_stream(params).await })
        })
    }
}

#[async_trait]
impl LanguageModel for WrappedLanguageModel {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn do_generate(&self, options: CallOptions) -> Result<GenerateResponse, ProviderError> {
        let params = self.transform_params(options, OperationType::Generate).await?;
        let info = self.info();

        let mut call = self.base_generate(&params);
        for middleware in self.middleware.iter().rev() {
            if let Some(wrap) = &middleware.wrap_generate {
                let wrap = Arc::clone(wrap);
                let inner = call;
                let params = params.clone();
                let info = info.clone();
                call = Arc::new(move || {
                    wrap(Arc::clone(&inner), params.clone(), info.clone())
                });
            }
        }

        call().await
    }

    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError> {
        let params = self.transform_params(options, OperationType::Stream).await?;
        let info = self.info();
        let generate = self.base_generate(&params);

        let mut call = self.base_stream(&params);
        for middleware in self.middleware.iter().rev() {
            if let Some(wrap) = &middleware.wrap_stream {
                let wrap = Arc::clone(wrap);
                let inner = call;
                let generate = Arc::clone(&generate);
                let params = params.clone();
                let info = info.clone();
                call = Arc::new(move || {
                    wrap(
                        Arc::clone(&inner),
                        Arc::clone(&generate),
                        params.clone(),
                        info.clone(),
                    )
                });
            }
        }

        call().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferkit_provider::language_model::content::{Content, Text};
    use inferkit_provider::language_model::finish_reason::FinishReason;
    use inferkit_provider::language_model::prompt::Message;
    use inferkit_provider::language_model::usage::Usage;
    use std::sync::Mutex;

    struct EchoModel;

    #[async_trait]
    impl LanguageModel for EchoModel {
        fn provider(&self) -> &str {
            "echo"
        }

        fn model_id(&self) -> &str {
            "echo-1"
        }

        async fn do_generate(
            &self,
            options: CallOptions,
        ) -> Result<GenerateResponse, ProviderError> {
            // Echo the temperature so tests can observe transformed params.
            let text = format!("temperature={:?}", options.temperature);
            Ok(GenerateResponse {
                content: vec![Content::Text(Text::new(text))],
                finish_reason: FinishReason::Stop,
                usage: Usage::new(1, 1),
                provider_metadata: None,
                request: None,
                response: None,
                warnings: vec![],
            })
        }

        async fn do_stream(&self, _: CallOptions) -> Result<StreamResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doStream", "echo"))
        }
    }

    fn recording_middleware(
        name: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    ) -> LanguageModelMiddleware {
        let transform_trace = Arc::clone(&trace);
        let wrap_trace = trace;
        LanguageModelMiddleware::new()
            .with_transform_params(Arc::new(move |params, _, _| {
                let trace = Arc::clone(&transform_trace);
                Box::pin(async move {
                    trace.lock().unwrap().push(format!("transform:{name}"));
                    Ok(params)
                })
            }))
            .with_wrap_generate(Arc::new(move |do_generate, _, _| {
                let trace = Arc::clone(&wrap_trace);
                Box::pin(async move {
                    trace.lock().unwrap().push(format!("enter:{name}"));
                    let result = do_generate().await;
                    trace.lock().unwrap().push(format!("exit:{name}"));
                    result
                })
            }))
    }

    #[test]
    fn empty_chain_returns_the_same_model() {
        let model: Arc<dyn LanguageModel> = Arc::new(EchoModel);
        let wrapped = wrap_language_model(Arc::clone(&model), vec![]);
        assert!(Arc::ptr_eq(&model, &wrapped));
    }

    #[tokio::test]
    async fn transform_runs_forward_and_wrap_composes_reverse() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let model = wrap_language_model(
            Arc::new(EchoModel),
            vec![
                recording_middleware("first", Arc::clone(&trace)),
                recording_middleware("second", Arc::clone(&trace)),
            ],
        );

        model
            .do_generate(CallOptions::new(vec![Message::user("hi")]))
            .await
            .unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                "transform:first",
                "transform:second",
                "enter:first",
                "enter:second",
                "exit:second",
                "exit:first",
            ]
        );
    }

    #[tokio::test]
    async fn transformed_params_reach_the_adapter() {
        let set_temperature = LanguageModelMiddleware::new().with_transform_params(Arc::new(
            |params, _, _| {
                Box::pin(async move { Ok(params.with_temperature(0.5)) })
            },
        ));
        let model = wrap_language_model(Arc::new(EchoModel), vec![set_temperature]);
        let result = model
            .do_generate(CallOptions::new(vec![Message::user("hi")]))
            .await
            .unwrap();
        assert_eq!(result.text(), "temperature=Some(0.5)");
    }
}
