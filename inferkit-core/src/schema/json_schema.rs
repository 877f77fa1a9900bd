use crate::schema::{Schema, SchemaError};
use serde_json::Value;

/// A validator over an arbitrary JSON Schema document.
pub struct JsonSchemaValidator {
    schema: Value,
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compile a JSON Schema document. Fails on invalid schemas.
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(&schema)
            .map_err(|err| SchemaError::new(format!("invalid JSON schema: {err}")))?;
        Ok(Self { schema, validator })
    }
}

impl Schema for JsonSchemaValidator {
    fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        match self.validator.validate(value) {
            Ok(()) => Ok(value.clone()),
            Err(error) => Err(SchemaError::at(
                error.instance_path.to_string(),
                error.to_string(),
            )),
        }
    }

    fn to_json_schema(&self) -> Value {
        self.schema.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validates_against_the_document() {
        let validator = JsonSchemaValidator::new(json!({
            "type": "object",
            "properties": {
                "a": {"type": "number"},
                "b": {"type": "number"}
            },
            "required": ["a", "b"]
        }))
        .unwrap();

        assert!(validator.validate(&json!({"a": 2, "b": 3})).is_ok());

        let err = validator.validate(&json!({"a": 2})).unwrap_err();
        assert!(err.message.contains("required"));
    }

    #[test]
    fn invalid_schema_fails_to_compile() {
        assert!(JsonSchemaValidator::new(json!({"type": "not-a-type"})).is_err());
    }

    #[test]
    fn round_trips_the_document() {
        let document = json!({"type": "array", "items": {"type": "string"}});
        let validator = JsonSchemaValidator::new(document.clone()).unwrap();
        assert_eq!(validator.to_json_schema(), document);
    }
}
