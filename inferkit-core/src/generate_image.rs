//! Image generation.

use inferkit_provider::language_model::call_warning::CallWarning;
use inferkit_provider::{ImageCallOptions, ImageModel, ProviderError};
use std::sync::Arc;

/// Result of an image generation call.
#[derive(Debug, Clone)]
pub struct GenerateImageResult {
    /// The generated images as raw bytes.
    pub images: Vec<Vec<u8>>,
    /// Non-fatal warnings.
    pub warnings: Vec<CallWarning>,
}

/// Generate one or more images from a prompt.
pub async fn generate_image(
    model: &Arc<dyn ImageModel>,
    options: ImageCallOptions,
) -> Result<GenerateImageResult, ProviderError> {
    if options.prompt.is_empty() {
        return Err(ProviderError::invalid_argument(
            "prompt",
            "image prompt must not be empty",
        ));
    }

    let response = model.do_generate(options).await?;
    if response.images.is_empty() {
        return Err(ProviderError::NoContentGenerated {
            message: "no images were generated".to_string(),
        });
    }

    Ok(GenerateImageResult {
        images: response.images,
        warnings: response.warnings,
    })
}
