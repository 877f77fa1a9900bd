//! Built-in middleware.

pub mod caching;
pub mod default_settings;
pub mod extract_reasoning;
pub mod logging;
pub mod retry;
pub mod simulate_streaming;
pub mod telemetry;
