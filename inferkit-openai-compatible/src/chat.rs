//! Chat-completions language model.

pub mod api_types;
pub mod convert_messages;
pub mod language_model;
pub mod map_finish_reason;
pub mod metadata_extractor;
pub mod prepare_tools;

pub use convert_messages::convert_to_openai_compatible_messages;
pub use language_model::ChatLanguageModel;
pub use map_finish_reason::map_openai_compatible_finish_reason;
pub use prepare_tools::prepare_tools;
