use crate::schema::{Schema, SchemaError};
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::OnceLock;

/// A schema derived from a Rust type.
///
/// Validation deserializes into `T` and re-serializes, so defaults and
/// renames applied by serde are reflected in the returned value. The JSON
/// Schema document comes from `schemars` and is computed once.
pub struct TypedSchema<T> {
    json_schema: OnceLock<Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T>
where
    T: JsonSchema + DeserializeOwned + Serialize,
{
    /// Create a schema for `T`.
    pub fn new() -> Self {
        Self {
            json_schema: OnceLock::new(),
            _marker: PhantomData,
        }
    }

    /// Validate and deserialize into the typed value.
    pub fn parse(&self, value: &Value) -> Result<T, SchemaError> {
        serde_json::from_value(value.clone()).map_err(|err| SchemaError::new(err.to_string()))
    }
}

impl<T> Default for TypedSchema<T>
where
    T: JsonSchema + DeserializeOwned + Serialize,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: JsonSchema + DeserializeOwned + Serialize,
{
    fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        let typed: T = self.parse(value)?;
        serde_json::to_value(typed).map_err(|err| SchemaError::new(err.to_string()))
    }

    fn to_json_schema(&self) -> Value {
        self.json_schema
            .get_or_init(|| {
                let schema = SchemaSettings::draft07()
                    .into_generator()
                    .into_root_schema_for::<T>();
                serde_json::to_value(schema).unwrap_or(Value::Null)
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
    struct Weather {
        city: String,
        temperature_c: f64,
    }

    #[test]
    fn valid_values_round_trip() {
        let schema = TypedSchema::<Weather>::new();
        let value = json!({"city": "Paris", "temperature_c": 21.5});
        assert_eq!(schema.validate(&value).unwrap(), value);
        assert_eq!(
            schema.parse(&value).unwrap(),
            Weather {
                city: "Paris".into(),
                temperature_c: 21.5
            }
        );
    }

    #[test]
    fn missing_fields_fail() {
        let schema = TypedSchema::<Weather>::new();
        assert!(schema.validate(&json!({"city": "Paris"})).is_err());
    }

    #[test]
    fn json_schema_lists_properties() {
        let schema = TypedSchema::<Weather>::new().to_json_schema();
        assert!(schema["properties"]["city"].is_object());
        assert!(schema["properties"]["temperature_c"].is_object());
    }
}
