use crate::error::ProviderError;
use crate::language_model::call_warning::CallWarning;
use crate::shared::{Headers, ProviderOptions};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// An image generation model.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Name of the provider.
    fn provider(&self) -> &str;

    /// Provider-specific model id.
    fn model_id(&self) -> &str;

    /// Generate images for a prompt.
    ///
    /// Whatever form the service returns images in (base64 or URLs), the
    /// adapter normalises them to raw byte buffers.
    async fn do_generate(&self, options: ImageCallOptions) -> Result<ImageResponse, ProviderError>;
}

/// Options for an image generation call.
#[derive(Debug, Clone)]
pub struct ImageCallOptions {
    /// The prompt describing the image.
    pub prompt: String,

    /// Number of images to generate.
    pub n: u32,

    /// Requested size, e.g. `"1024x1024"`.
    pub size: Option<String>,

    /// Requested aspect ratio, e.g. `"16:9"`.
    pub aspect_ratio: Option<String>,

    /// Seed for deterministic generation, where supported.
    pub seed: Option<u32>,

    /// Additional HTTP headers for this request.
    pub headers: Option<Headers>,

    /// Provider-specific options.
    pub provider_options: Option<ProviderOptions>,

    /// Cancellation signal.
    pub abort_signal: Option<CancellationToken>,
}

impl ImageCallOptions {
    /// Create options for a single image from a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            n: 1,
            size: None,
            aspect_ratio: None,
            seed: None,
            headers: None,
            provider_options: None,
            abort_signal: None,
        }
    }
}

/// Response from an image generation call.
#[derive(Debug, Clone)]
pub struct ImageResponse {
    /// The generated images as raw bytes.
    pub images: Vec<Vec<u8>>,

    /// Non-fatal warnings from the call.
    pub warnings: Vec<CallWarning>,

    /// Response metadata.
    pub response: Option<ImageResponseMetadata>,
}

/// Metadata echoed with an image response.
#[derive(Debug, Clone, Default)]
pub struct ImageResponseMetadata {
    /// The model id the server actually used.
    pub model_id: Option<String>,

    /// Response headers.
    pub headers: Option<Headers>,
}
