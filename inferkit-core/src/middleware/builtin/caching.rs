//! Response caching for generate calls.

use crate::middleware::language_model::{LanguageModelMiddleware, ModelInfo};
use inferkit_provider::GenerateResponse;
use inferkit_provider::language_model::call_options::CallOptions;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

/// A store for cached generate responses.
///
/// The store synchronises its own access; the framework calls it from
/// concurrent tasks without any outer lock.
pub trait CacheStore: Send + Sync {
    /// Look up a non-expired entry.
    fn get(&self, key: &str) -> Option<GenerateResponse>;

    /// Insert an entry with a time-to-live.
    fn set(&self, key: String, value: GenerateResponse, ttl: Duration);
}

/// The default in-memory store: a process-wide map with per-entry expiry.
///
/// Suitable for a single process only. Deployments that need shared or
/// bounded caching inject their own [`CacheStore`].
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, (GenerateResponse, Instant)>>,
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Option<GenerateResponse> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: String, value: GenerateResponse, ttl: Duration) {
        self.entries
            .lock()
            .unwrap()
            .insert(key, (value, Instant::now() + ttl));
    }
}

fn global_store() -> Arc<InMemoryCacheStore> {
    static STORE: OnceLock<Arc<InMemoryCacheStore>> = OnceLock::new();
    Arc::clone(STORE.get_or_init(|| Arc::new(InMemoryCacheStore::default())))
}

fn cache_key(params: &CallOptions, model: &ModelInfo) -> String {
    let serialized = serde_json::to_string(params).unwrap_or_default();
    let digest = Sha256::digest(serialized.as_bytes());
    format!("{}:{}:{:x}", model.provider, model.model_id, digest)
}

/// Caching middleware over the process-wide in-memory store.
///
/// Keys are a hash of the provider, model and full call options, so two
/// calls hit the same entry only when they are identical requests. Streams
/// are never cached.
pub fn caching_middleware(ttl: Duration) -> LanguageModelMiddleware {
    caching_middleware_with_store(ttl, global_store())
}

/// Caching middleware over a caller-supplied store.
pub fn caching_middleware_with_store(
    ttl: Duration,
    store: Arc<dyn CacheStore>,
) -> LanguageModelMiddleware {
    LanguageModelMiddleware::new().with_wrap_generate(Arc::new(move |do_generate, params, model| {
        let store = Arc::clone(&store);
        Box::pin(async move {
            let key = cache_key(&params, &model);

            if let Some(cached) = store.get(&key) {
                log::debug!("cache hit for {}/{}", model.provider, model.model_id);
                return Ok(cached);
            }

            log::debug!("cache miss for {}/{}", model.provider, model.model_id);
            let result = do_generate().await?;
            store.set(key, result.clone(), ttl);
            Ok(result)
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::wrap::wrap_language_model;
    use async_trait::async_trait;
    use inferkit_provider::language_model::content::{Content, Text};
    use inferkit_provider::language_model::finish_reason::FinishReason;
    use inferkit_provider::language_model::prompt::Message;
    use inferkit_provider::language_model::usage::Usage;
    use inferkit_provider::{LanguageModel, ProviderError, StreamResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LanguageModel for CountingModel {
        fn provider(&self) -> &str {
            "counting"
        }

        fn model_id(&self) -> &str {
            "count-1"
        }

        async fn do_generate(&self, _: CallOptions) -> Result<GenerateResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GenerateResponse {
                content: vec![Content::Text(Text::new("cached?"))],
                finish_reason: FinishReason::Stop,
                usage: Usage::new(1, 1),
                provider_metadata: None,
                request: None,
                response: None,
                warnings: vec![],
            })
        }

        async fn do_stream(&self, _: CallOptions) -> Result<StreamResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doStream", "counting"))
        }
    }

    #[tokio::test]
    async fn identical_calls_hit_the_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::default());
        let model = wrap_language_model(
            Arc::new(CountingModel {
                calls: Arc::clone(&calls),
            }),
            vec![caching_middleware_with_store(
                Duration::from_secs(300),
                store,
            )],
        );

        let options = CallOptions::new(vec![Message::user("Say hi")]).with_temperature(0.0);
        let first = model.do_generate(options.clone()).await.unwrap();
        let second = model.do_generate(options).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.text(), second.text());
    }

    #[tokio::test]
    async fn different_params_miss() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::default());
        let model = wrap_language_model(
            Arc::new(CountingModel {
                calls: Arc::clone(&calls),
            }),
            vec![caching_middleware_with_store(
                Duration::from_secs(300),
                store,
            )],
        );

        let options = CallOptions::new(vec![Message::user("Say hi")]);
        model.do_generate(options.clone().with_temperature(0.0)).await.unwrap();
        model.do_generate(options.with_temperature(1.0)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn expired_entries_are_evicted() {
        let store = InMemoryCacheStore::default();
        let response = GenerateResponse {
            content: vec![],
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
            provider_metadata: None,
            request: None,
            response: None,
            warnings: vec![],
        };
        store.set("key".into(), response, Duration::from_secs(0));
        assert!(store.get("key").is_none());
    }
}
