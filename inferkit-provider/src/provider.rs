use crate::embedding_model::EmbeddingModel;
use crate::error::ProviderError;
use crate::image_model::ImageModel;
use crate::language_model::LanguageModel;
use crate::speech_model::SpeechModel;
use crate::transcription_model::TranscriptionModel;
use std::sync::Arc;

/// A factory producing model instances for a single backend service.
///
/// Every factory method has a default implementation that reports the
/// model type as unsupported, so a provider only implements the types its
/// service actually offers. Calls for anything else fail with
/// [`ProviderError::UnsupportedFunctionality`] at dispatch time, before
/// any network traffic.
pub trait Provider: Send + Sync {
    /// The provider's id, e.g. `"openai"`.
    fn provider_id(&self) -> &str;

    /// Return the language model with the given id.
    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        let _ = model_id;
        Err(ProviderError::unsupported_functionality(
            "languageModel",
            self.provider_id(),
        ))
    }

    /// Return the text embedding model with the given id.
    fn text_embedding_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn EmbeddingModel<String>>, ProviderError> {
        let _ = model_id;
        Err(ProviderError::unsupported_functionality(
            "textEmbeddingModel",
            self.provider_id(),
        ))
    }

    /// Return the image model with the given id.
    fn image_model(&self, model_id: &str) -> Result<Arc<dyn ImageModel>, ProviderError> {
        let _ = model_id;
        Err(ProviderError::unsupported_functionality(
            "imageModel",
            self.provider_id(),
        ))
    }

    /// Return the speech model with the given id.
    fn speech_model(&self, model_id: &str) -> Result<Arc<dyn SpeechModel>, ProviderError> {
        let _ = model_id;
        Err(ProviderError::unsupported_functionality(
            "speechModel",
            self.provider_id(),
        ))
    }

    /// Return the transcription model with the given id.
    fn transcription_model(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn TranscriptionModel>, ProviderError> {
        let _ = model_id;
        Err(ProviderError::unsupported_functionality(
            "transcriptionModel",
            self.provider_id(),
        ))
    }
}
