//! Schema validation bridge for structured outputs.
//!
//! Structured-output callers supply a schema in any supported form: a Rust
//! type deriving `schemars::JsonSchema` + `serde::Deserialize`
//! ([`TypedSchema`]), an arbitrary JSON Schema document
//! ([`JsonSchemaValidator`]), or the small combinator DSL in [`dsl`].
//! Every form exposes the same two operations: validate a value, and
//! render the schema as JSON Schema for adapters that support server-side
//! enforcement (`response_format`).

pub mod dsl;
pub mod json_schema;
pub mod typed;

pub use dsl::{array, boolean, number, object, string};
pub use json_schema::JsonSchemaValidator;
pub use typed::TypedSchema;

use serde_json::Value;
use thiserror::Error;

/// A schema validation failure.
#[derive(Debug, Clone, Error)]
#[error("schema validation failed: {message}")]
pub struct SchemaError {
    /// What went wrong.
    pub message: String,
    /// Path into the value where the failure occurred, when known.
    pub path: Option<String>,
}

impl SchemaError {
    /// Create an error with no path information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// Create an error anchored at a path within the validated value.
    pub fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

/// A validator over JSON values.
pub trait Schema: Send + Sync {
    /// Validate a value, returning the (possibly normalised) value on
    /// success.
    fn validate(&self, value: &Value) -> Result<Value, SchemaError>;

    /// Render this schema as a JSON Schema document.
    fn to_json_schema(&self) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_three_forms_expose_the_same_surface() {
        let schemas: Vec<Box<dyn Schema>> = vec![
            Box::new(string()),
            Box::new(JsonSchemaValidator::new(json!({"type": "string"})).unwrap()),
        ];
        for schema in schemas {
            assert!(schema.validate(&json!("ok")).is_ok());
            assert!(schema.validate(&json!(42)).is_err());
            assert_eq!(schema.to_json_schema()["type"], "string");
        }
    }
}
