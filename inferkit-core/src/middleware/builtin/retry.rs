//! Retry with exponential backoff and jitter.

use crate::middleware::language_model::LanguageModelMiddleware;
use std::sync::Arc;
use std::time::Duration;

/// Retry policy.
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// How many retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per attempt.
    pub backoff_factor: f64,
    /// Randomise each delay to avoid thundering herds.
    pub jitter: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_secs(60),
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

impl RetryOptions {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);
        let with_jitter = if self.jitter {
            // Half fixed, half random, so the delay stays within
            // [capped/2, capped].
            capped / 2.0 + rand::random::<f64>() * capped / 2.0
        } else {
            capped
        };
        Duration::from_millis(with_jitter as u64)
    }
}

/// Middleware retrying retryable failures with exponential backoff.
///
/// Only errors the transport marked retryable (connection failures, 408,
/// 409, 429 and 5xx) are retried; configuration, decoding and validation
/// errors surface immediately. Adapters themselves never retry — this
/// middleware is the only retry site in the stack.
pub fn retry_middleware(options: RetryOptions) -> LanguageModelMiddleware {
    let generate_options = options.clone();
    let stream_options = options;

    LanguageModelMiddleware::new()
        .with_wrap_generate(Arc::new(move |do_generate, _params, model| {
            let options = generate_options.clone();
            Box::pin(async move {
                let mut attempt = 0;
                loop {
                    match do_generate().await {
                        Ok(result) => return Ok(result),
                        Err(err) if err.is_retryable() && attempt < options.max_retries => {
                            let delay = options.delay_for_attempt(attempt);
                            log::warn!(
                                "retrying {}/{} after {:?} (attempt {}): {err}",
                                model.provider,
                                model.model_id,
                                delay,
                                attempt + 1
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        Err(err) => return Err(err),
                    }
                }
            })
        }))
        .with_wrap_stream(Arc::new(move |do_stream, _do_generate, _params, model| {
            let options = stream_options.clone();
            Box::pin(async move {
                // Only stream initiation is retried; events already
                // delivered to the caller cannot be replayed.
                let mut attempt = 0;
                loop {
                    match do_stream().await {
                        Ok(result) => return Ok(result),
                        Err(err) if err.is_retryable() && attempt < options.max_retries => {
                            let delay = options.delay_for_attempt(attempt);
                            log::warn!(
                                "retrying stream to {}/{} after {:?}: {err}",
                                model.provider,
                                model.model_id,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        Err(err) => return Err(err),
                    }
                }
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
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyModel {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
        retryable: bool,
    }

    #[async_trait]
    impl LanguageModel for FlakyModel {
        fn provider(&self) -> &str {
            "flaky"
        }

        fn model_id(&self) -> &str {
            "flaky-1"
        }

        async fn do_generate(&self, _: CallOptions) -> Result<GenerateResponse, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(if self.retryable {
                    ProviderError::api_call("overloaded", "https://api.flaky", 503, None, None)
                } else {
                    ProviderError::api_call("bad request", "https://api.flaky", 400, None, None)
                });
            }
            Ok(GenerateResponse {
                content: vec![],
                finish_reason: FinishReason::Stop,
                usage: Usage::default(),
                provider_metadata: None,
                request: None,
                response: None,
                warnings: vec![],
            })
        }

        async fn do_stream(&self, _: CallOptions) -> Result<StreamResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doStream", "flaky"))
        }
    }

    fn fast_retry() -> RetryOptions {
        RetryOptions {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_factor: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn retries_retryable_errors_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = wrap_language_model(
            Arc::new(FlakyModel {
                calls: Arc::clone(&calls),
                fail_first: 2,
                retryable: true,
            }),
            vec![retry_middleware(fast_retry())],
        );

        model
            .do_generate(CallOptions::new(vec![Message::user("hi")]))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = wrap_language_model(
            Arc::new(FlakyModel {
                calls: Arc::clone(&calls),
                fail_first: 1,
                retryable: false,
            }),
            vec![retry_middleware(fast_retry())],
        );

        let err = model
            .do_generate(CallOptions::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = wrap_language_model(
            Arc::new(FlakyModel {
                calls: Arc::clone(&calls),
                fail_first: 10,
                retryable: true,
            }),
            vec![retry_middleware(fast_retry())],
        );

        let err = model
            .do_generate(CallOptions::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 4); // 1 initial + 3 retries
    }

    #[test]
    fn backoff_grows_and_caps() {
        let options = RetryOptions {
            jitter: false,
            ..fast_retry()
        };
        assert_eq!(options.delay_for_attempt(0), Duration::from_millis(1));
        assert_eq!(options.delay_for_attempt(1), Duration::from_millis(2));
        assert_eq!(options.delay_for_attempt(10), Duration::from_millis(5));
    }
}
