//! Gladia provider for inferkit.
//!
//! Transcription is asynchronous on Gladia's side: the audio is uploaded
//! to an ingest endpoint, a transcription job is created, and the result
//! URL is polled until the job reports done or error.

pub mod options;
pub mod provider;
pub mod transcription;

pub use provider::{GladiaProvider, GladiaProviderSettings, create_gladia};
pub use transcription::GladiaTranscriptionModel;
