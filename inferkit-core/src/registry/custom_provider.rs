use inferkit_provider::{
    EmbeddingModel, ImageModel, LanguageModel, Provider, ProviderError, SpeechModel,
    TranscriptionModel,
};
use std::collections::HashMap;
use std::sync::Arc;

/// A provider assembled from explicit model maps.
///
/// Lookup checks the map for the requested type first, then delegates to
/// the fallback provider if one is set, and otherwise reports the model as
/// unknown. Useful for aliasing curated model names to instances from
/// other providers (possibly wrapped in middleware).
pub struct CustomProvider {
    provider_id: String,
    language_models: HashMap<String, Arc<dyn LanguageModel>>,
    text_embedding_models: HashMap<String, Arc<dyn EmbeddingModel<String>>>,
    image_models: HashMap<String, Arc<dyn ImageModel>>,
    speech_models: HashMap<String, Arc<dyn SpeechModel>>,
    transcription_models: HashMap<String, Arc<dyn TranscriptionModel>>,
    fallback: Option<Arc<dyn Provider>>,
}

impl CustomProvider {
    /// Create an empty custom provider.
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            language_models: HashMap::new(),
            text_embedding_models: HashMap::new(),
            image_models: HashMap::new(),
            speech_models: HashMap::new(),
            transcription_models: HashMap::new(),
            fallback: None,
        }
    }

    /// Register a language model under an id.
    pub fn with_language_model(
        mut self,
        model_id: impl Into<String>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        self.language_models.insert(model_id.into(), model);
        self
    }

    /// Register a text embedding model under an id.
    pub fn with_text_embedding_model(
        mut self,
        model_id: impl Into<String>,
        model: Arc<dyn EmbeddingModel<String>>,
    ) -> Self {
        self.text_embedding_models.insert(model_id.into(), model);
        self
    }

    /// Register an image model under an id.
    pub fn with_image_model(
        mut self,
        model_id: impl Into<String>,
        model: Arc<dyn ImageModel>,
    ) -> Self {
        self.image_models.insert(model_id.into(), model);
        self
    }

    /// Register a speech model under an id.
    pub fn with_speech_model(
        mut self,
        model_id: impl Into<String>,
        model: Arc<dyn SpeechModel>,
    ) -> Self {
        self.speech_models.insert(model_id.into(), model);
        self
    }

    /// Register a transcription model under an id.
    pub fn with_transcription_model(
        mut self,
        model_id: impl Into<String>,
        model: Arc<dyn TranscriptionModel>,
    ) -> Self {
        self.transcription_models.insert(model_id.into(), model);
        self
    }

    /// Delegate unknown model ids to another provider.
    pub fn with_fallback(mut self, fallback: Arc<dyn Provider>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

impl Provider for CustomProvider {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        if let Some(model) = self.language_models.get(model_id) {
            return Ok(Arc::clone(model));
        }
        match &self.fallback {
            Some(fallback) => fallback.language_model(model_id),
            None => Err(ProviderError::no_such_model(model_id, &self.provider_id)),
        }
    }

    fn text_embedding_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn EmbeddingModel<String>>, ProviderError> {
        if let Some(model) = self.text_embedding_models.get(model_id) {
            return Ok(Arc::clone(model));
        }
        match &self.fallback {
            Some(fallback) => fallback.text_embedding_model(model_id),
            None => Err(ProviderError::no_such_model(model_id, &self.provider_id)),
        }
    }

    fn image_model(&self, model_id: &str) -> Result<Arc<dyn ImageModel>, ProviderError> {
        if let Some(model) = self.image_models.get(model_id) {
            return Ok(Arc::clone(model));
        }
        match &self.fallback {
            Some(fallback) => fallback.image_model(model_id),
            None => Err(ProviderError::no_such_model(model_id, &self.provider_id)),
        }
    }

    fn speech_model(&self, model_id: &str) -> Result<Arc<dyn SpeechModel>, ProviderError> {
        if let Some(model) = self.speech_models.get(model_id) {
            return Ok(Arc::clone(model));
        }
        match &self.fallback {
            Some(fallback) => fallback.speech_model(model_id),
            None => Err(ProviderError::no_such_model(model_id, &self.provider_id)),
        }
    }

    fn transcription_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn TranscriptionModel>, ProviderError> {
        if let Some(model) = self.transcription_models.get(model_id) {
            return Ok(Arc::clone(model));
        }
        match &self.fallback {
            Some(fallback) => fallback.transcription_model(model_id),
            None => Err(ProviderError::no_such_model(model_id, &self.provider_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inferkit_provider::language_model::call_options::CallOptions;
    use inferkit_provider::{GenerateResponse, StreamResponse};

    struct NamedModel(&'static str);

    #[async_trait]
    impl LanguageModel for NamedModel {
        fn provider(&self) -> &str {
            "named"
        }

        fn model_id(&self) -> &str {
            self.0
        }

        async fn do_generate(&self, _: CallOptions) -> Result<GenerateResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doGenerate", "named"))
        }

        async fn do_stream(&self, _: CallOptions) -> Result<StreamResponse, ProviderError> {
            Err(ProviderError::unsupported_functionality("doStream", "named"))
        }
    }

    struct FallbackProvider;

    impl Provider for FallbackProvider {
        fn provider_id(&self) -> &str {
            "fallback"
        }

        fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
            Ok(Arc::new(NamedModel(Box::leak(
                model_id.to_string().into_boxed_str(),
            ))))
        }
    }

    #[test]
    fn map_lookup_returns_the_registered_instance() {
        let model: Arc<dyn LanguageModel> = Arc::new(NamedModel("alias"));
        let provider = CustomProvider::new("custom").with_language_model("alias", Arc::clone(&model));
        let resolved = provider.language_model("alias").unwrap();
        assert!(Arc::ptr_eq(&model, &resolved));
    }

    #[test]
    fn unknown_model_without_fallback_errors() {
        let provider = CustomProvider::new("custom");
        let err = provider.language_model("nope").unwrap_err();
        assert!(matches!(err, ProviderError::NoSuchModel { .. }));
    }

    #[test]
    fn unknown_model_delegates_to_fallback() {
        let provider = CustomProvider::new("custom").with_fallback(Arc::new(FallbackProvider));
        let model = provider.language_model("delegated").unwrap();
        assert_eq!(model.model_id(), "delegated");
    }

    #[test]
    fn unsupported_type_without_fallback_reports_no_such_model() {
        let provider = CustomProvider::new("custom");
        assert!(provider.speech_model("voice").is_err());
    }
}
