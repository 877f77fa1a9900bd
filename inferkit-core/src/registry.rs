//! Provider registry: named providers with unified `provider:model` lookup.

pub mod custom_provider;
pub mod error;

pub use custom_provider::CustomProvider;
pub use error::RegistryError;

use crate::middleware::language_model::LanguageModelMiddleware;
use crate::middleware::wrap::wrap_language_model;
use inferkit_provider::{
    EmbeddingModel, ImageModel, LanguageModel, Provider, ProviderError, SpeechModel,
    TranscriptionModel,
};
use std::collections::HashMap;
use std::sync::Arc;

/// A named collection of providers with `provider:model` lookup.
///
/// Model ids take the form `<provider_id><separator><model_id>`; the first
/// occurrence of the separator splits them. Language models returned by
/// the registry optionally get a middleware chain applied; other model
/// types pass through untouched, and with no middleware configured the
/// provider's own instance is returned as-is.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
    separator: String,
    language_model_middleware: Vec<LanguageModelMiddleware>,
}

impl ProviderRegistry {
    /// Create an empty registry with the default `:` separator.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            separator: ":".to_string(),
            language_model_middleware: Vec::new(),
        }
    }

    /// Use a different separator between provider id and model id.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Apply middleware to every language model the registry returns.
    ///
    /// Middleware is resolved here, at registration time; it must not
    /// dispatch back through the registry.
    pub fn with_language_model_middleware(
        mut self,
        middleware: Vec<LanguageModelMiddleware>,
    ) -> Self {
        self.language_model_middleware = middleware;
        self
    }

    /// Register a provider under an id.
    pub fn register_provider(&mut self, provider_id: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(provider_id.into(), provider);
    }

    /// Remove a provider.
    pub fn unregister_provider(&mut self, provider_id: &str) {
        self.providers.remove(provider_id);
    }

    /// The registered provider ids, sorted.
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Look up a registered provider directly.
    pub fn provider(&self, provider_id: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(provider_id)
    }

    fn split_model_id<'a>(
        &self,
        model_id: &'a str,
        model_type: &'static str,
    ) -> Result<(&'a str, &'a str), RegistryError> {
        match model_id.split_once(self.separator.as_str()) {
            Some((provider_id, rest)) if !provider_id.is_empty() && !rest.is_empty() => {
                Ok((provider_id, rest))
            }
            _ => Err(RegistryError::NoSuchModel {
                model_id: model_id.to_string(),
                model_type,
                message: format!(
                    "invalid {model_type} id for registry: '{model_id}' (must be 'providerId{}modelId')",
                    self.separator
                ),
            }),
        }
    }

    fn get_provider(
        &self,
        provider_id: &str,
        model_id: &str,
        model_type: &'static str,
    ) -> Result<&Arc<dyn Provider>, RegistryError> {
        self.providers
            .get(provider_id)
            .ok_or_else(|| RegistryError::NoSuchProvider {
                provider_id: provider_id.to_string(),
                model_id: model_id.to_string(),
                model_type,
                available_providers: self.provider_ids(),
            })
    }

    fn convert_lookup_error(
        err: ProviderError,
        model_id: &str,
        model_type: &'static str,
    ) -> RegistryError {
        match err {
            ProviderError::NoSuchModel { .. } => RegistryError::NoSuchModel {
                model_id: model_id.to_string(),
                model_type,
                message: err.to_string(),
            },
            other => RegistryError::Provider(other),
        }
    }

    /// Resolve a language model by `provider:model` id.
    pub fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, RegistryError> {
        let (provider_id, model_name) = self.split_model_id(model_id, "languageModel")?;
        let provider = self.get_provider(provider_id, model_id, "languageModel")?;
        let model = provider
            .language_model(model_name)
            .map_err(|err| Self::convert_lookup_error(err, model_id, "languageModel"))?;

        Ok(wrap_language_model(
            model,
            self.language_model_middleware.clone(),
        ))
    }

    /// Resolve a text embedding model by `provider:model` id.
    pub fn text_embedding_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn EmbeddingModel<String>>, RegistryError> {
        let (provider_id, model_name) = self.split_model_id(model_id, "textEmbeddingModel")?;
        let provider = self.get_provider(provider_id, model_id, "textEmbeddingModel")?;
        provider
            .text_embedding_model(model_name)
            .map_err(|err| Self::convert_lookup_error(err, model_id, "textEmbeddingModel"))
    }

    /// Resolve an image model by `provider:model` id.
    pub fn image_model(&self, model_id: &str) -> Result<Arc<dyn ImageModel>, RegistryError> {
        let (provider_id, model_name) = self.split_model_id(model_id, "imageModel")?;
        let provider = self.get_provider(provider_id, model_id, "imageModel")?;
        provider
            .image_model(model_name)
            .map_err(|err| Self::convert_lookup_error(err, model_id, "imageModel"))
    }

    /// Resolve a speech model by `provider:model` id.
    pub fn speech_model(&self, model_id: &str) -> Result<Arc<dyn SpeechModel>, RegistryError> {
        let (provider_id, model_name) = self.split_model_id(model_id, "speechModel")?;
        let provider = self.get_provider(provider_id, model_id, "speechModel")?;
        provider
            .speech_model(model_name)
            .map_err(|err| Self::convert_lookup_error(err, model_id, "speechModel"))
    }

    /// Resolve a transcription model by `provider:model` id.
    pub fn transcription_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn TranscriptionModel>, RegistryError> {
        let (provider_id, model_name) = self.split_model_id(model_id, "transcriptionModel")?;
        let provider = self.get_provider(provider_id, model_id, "transcriptionModel")?;
        provider
            .transcription_model(model_name)
            .map_err(|err| Self::convert_lookup_error(err, model_id, "transcriptionModel"))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry from a map of providers.
pub fn create_provider_registry(
    providers: HashMap<String, Arc<dyn Provider>>,
) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for (provider_id, provider) in providers {
        registry.register_provider(provider_id, provider);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inferkit_provider::language_model::call_options::CallOptions;
    use inferkit_provider::{GenerateResponse, StreamResponse};

    struct TestModel {
        provider: &'static str,
        model_id: String,
    }

    #[async_trait]
    impl LanguageModel for TestModel {
        fn provider(&self) -> &str {
            self.provider
        }

        fn model_id(&self) -> &str {
            &self.model_id
        }

        async fn do_generate(&self, _: CallOptions) -> Result<GenerateResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doGenerate", self.provider))
        }

        async fn do_stream(&self, _: CallOptions) -> Result<StreamResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doStream", self.provider))
        }
    }

    struct TestProvider {
        id: &'static str,
    }

    impl Provider for TestProvider {
        fn provider_id(&self) -> &str {
            self.id
        }

        fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
            if model_id == "missing" {
                return Err(ProviderError::no_such_model(model_id, self.id));
            }
            Ok(Arc::new(TestModel {
                provider: self.id,
                model_id: model_id.to_string(),
            }))
        }
    }

    fn registry() -> ProviderRegistry {
        let mut providers: HashMap<String, Arc<dyn Provider>> = HashMap::new();
        providers.insert("openai".into(), Arc::new(TestProvider { id: "openai" }));
        providers.insert(
            "anthropic".into(),
            Arc::new(TestProvider { id: "anthropic" }),
        );
        create_provider_registry(providers)
    }

    #[test]
    fn resolves_language_models_by_prefixed_id() {
        let registry = registry();
        let model = registry.language_model("openai:gpt-4o").unwrap();
        assert_eq!(model.provider(), "openai");
        assert_eq!(model.model_id(), "gpt-4o");

        // The model id may itself contain the separator; only the first
        // occurrence splits.
        let nested = registry.language_model("anthropic:claude:latest").unwrap();
        assert_eq!(nested.model_id(), "claude:latest");
    }

    #[test]
    fn unknown_provider_lists_available() {
        let registry = registry();
        let err = registry.language_model("missing:x").unwrap_err();
        match err {
            RegistryError::NoSuchProvider {
                provider_id,
                available_providers,
                ..
            } => {
                assert_eq!(provider_id, "missing");
                assert_eq!(available_providers, vec!["anthropic", "openai"]);
            }
            other => panic!("expected NoSuchProvider, got {other:?}"),
        }
    }

    #[test]
    fn missing_separator_is_no_such_model() {
        let registry = registry();
        let err = registry.language_model("gpt-4o").unwrap_err();
        assert!(matches!(err, RegistryError::NoSuchModel { .. }));
    }

    #[test]
    fn unknown_model_within_known_provider() {
        let registry = registry();
        let err = registry.language_model("openai:missing").unwrap_err();
        assert!(matches!(err, RegistryError::NoSuchModel { .. }));
    }

    #[test]
    fn no_middleware_returns_the_providers_instance() {
        let provider = TestProvider { id: "openai" };
        let direct = provider.language_model("gpt-4o").unwrap();
        // Both lookups construct fresh models here, so compare identity
        // semantics through the wrapper instead: with no middleware the
        // registry must not wrap.
        let registry = registry();
        let resolved = registry.language_model("openai:gpt-4o").unwrap();
        assert_eq!(resolved.provider(), direct.provider());
        assert_eq!(resolved.model_id(), direct.model_id());
    }

    #[test]
    fn custom_separator() {
        let mut providers: HashMap<String, Arc<dyn Provider>> = HashMap::new();
        providers.insert("openai".into(), Arc::new(TestProvider { id: "openai" }));
        let registry = create_provider_registry(providers).with_separator(" > ");
        let model = registry.language_model("openai > gpt-4o").unwrap();
        assert_eq!(model.model_id(), "gpt-4o");
    }
}
