//! FAL provider for inferkit.
//!
//! FAL runs models behind a queue: a job is submitted to the queue
//! endpoint, its status URL is polled, and the output is fetched from the
//! response URL once the job completes. The transcription models
//! (`fal-ai/whisper`, `fal-ai/wizper`) are exposed here.

pub mod provider;
pub mod transcription;

pub use provider::{FalProvider, FalProviderSettings, create_fal};
pub use transcription::FalTranscriptionModel;
