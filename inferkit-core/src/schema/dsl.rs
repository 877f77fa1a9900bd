//! A small schema combinator DSL.
//!
//! For callers who want a schema without a Rust type or a hand-written
//! JSON Schema document:
//!
//! ```
//! use inferkit_core::schema::{Schema, dsl};
//!
//! let schema = dsl::object([
//!     ("a", dsl::number()),
//!     ("b", dsl::number()),
//!     ("note", dsl::string().optional()),
//! ]);
//! assert!(schema.validate(&serde_json::json!({"a": 1, "b": 2})).is_ok());
//! ```

use crate::schema::{Schema, SchemaError};
use serde_json::{Map, Value, json};

/// A schema built from combinators.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    kind: NodeKind,
    optional: bool,
    description: Option<String>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    String,
    Number,
    Boolean,
    Object(Vec<(String, SchemaNode)>),
    Array(Box<SchemaNode>),
}

/// A string schema.
pub fn string() -> SchemaNode {
    SchemaNode::new(NodeKind::String)
}

/// A number schema (accepts integers and floats).
pub fn number() -> SchemaNode {
    SchemaNode::new(NodeKind::Number)
}

/// A boolean schema.
pub fn boolean() -> SchemaNode {
    SchemaNode::new(NodeKind::Boolean)
}

/// An object schema with the given properties. Properties are required
/// unless marked [`SchemaNode::optional`]; unknown keys are rejected.
pub fn object<const N: usize>(properties: [(&str, SchemaNode); N]) -> SchemaNode {
    SchemaNode::new(NodeKind::Object(
        properties
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect(),
    ))
}

/// An array schema with uniform item type.
pub fn array(items: SchemaNode) -> SchemaNode {
    SchemaNode::new(NodeKind::Array(Box::new(items)))
}

impl SchemaNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            optional: false,
            description: None,
        }
    }

    /// Mark this node optional within its parent object.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach a description, surfaced in the JSON Schema output.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), SchemaError> {
        match &self.kind {
            NodeKind::String => {
                if !value.is_string() {
                    return Err(SchemaError::at(path, "expected a string"));
                }
            }
            NodeKind::Number => {
                if !value.is_number() {
                    return Err(SchemaError::at(path, "expected a number"));
                }
            }
            NodeKind::Boolean => {
                if !value.is_boolean() {
                    return Err(SchemaError::at(path, "expected a boolean"));
                }
            }
            NodeKind::Object(properties) => {
                let Some(map) = value.as_object() else {
                    return Err(SchemaError::at(path, "expected an object"));
                };
                for (name, node) in properties {
                    let child_path = format!("{path}/{name}");
                    match map.get(name) {
                        Some(child) => node.check(child, &child_path)?,
                        None if node.optional => {}
                        None => {
                            return Err(SchemaError::at(
                                child_path,
                                format!("missing required property '{name}'"),
                            ));
                        }
                    }
                }
                for key in map.keys() {
                    if !properties.iter().any(|(name, _)| name == key) {
                        return Err(SchemaError::at(
                            format!("{path}/{key}"),
                            format!("unknown property '{key}'"),
                        ));
                    }
                }
            }
            NodeKind::Array(items) => {
                let Some(elements) = value.as_array() else {
                    return Err(SchemaError::at(path, "expected an array"));
                };
                for (index, element) in elements.iter().enumerate() {
                    items.check(element, &format!("{path}/{index}"))?;
                }
            }
        }
        Ok(())
    }
}

impl Schema for SchemaNode {
    fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        self.check(value, "")?;
        Ok(value.clone())
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = match &self.kind {
            NodeKind::String => json!({"type": "string"}),
            NodeKind::Number => json!({"type": "number"}),
            NodeKind::Boolean => json!({"type": "boolean"}),
            NodeKind::Object(properties) => {
                let mut props = Map::new();
                let mut required = Vec::new();
                for (name, node) in properties {
                    props.insert(name.clone(), node.to_json_schema());
                    if !node.optional {
                        required.push(Value::String(name.clone()));
                    }
                }
                json!({
                    "type": "object",
                    "properties": Value::Object(props),
                    "required": Value::Array(required),
                    "additionalProperties": false,
                })
            }
            NodeKind::Array(items) => json!({
                "type": "array",
                "items": items.to_json_schema(),
            }),
        };
        if let Some(description) = &self.description {
            schema["description"] = json!(description);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives() {
        assert!(string().validate(&json!("hi")).is_ok());
        assert!(string().validate(&json!(1)).is_err());
        assert!(number().validate(&json!(1.5)).is_ok());
        assert!(boolean().validate(&json!(true)).is_ok());
    }

    #[test]
    fn objects_require_declared_properties() {
        let schema = object([("a", number()), ("b", number())]);
        assert!(schema.validate(&json!({"a": 2, "b": 3})).is_ok());

        let err = schema.validate(&json!({"a": 2})).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("/b"));

        let unknown = schema.validate(&json!({"a": 2, "b": 3, "c": 4})).unwrap_err();
        assert!(unknown.message.contains("unknown property"));
    }

    #[test]
    fn optional_properties_may_be_absent() {
        let schema = object([("a", number()), ("note", string().optional())]);
        assert!(schema.validate(&json!({"a": 1})).is_ok());
        assert!(schema.validate(&json!({"a": 1, "note": "x"})).is_ok());
        assert!(schema.validate(&json!({"a": 1, "note": 2})).is_err());
    }

    #[test]
    fn arrays_check_every_element() {
        let schema = array(number());
        assert!(schema.validate(&json!([1, 2, 3])).is_ok());
        let err = schema.validate(&json!([1, "two"])).unwrap_err();
        assert_eq!(err.path.as_deref(), Some("/1"));
    }

    #[test]
    fn json_schema_output_matches_structure() {
        let schema = object([("a", number()), ("note", string().optional())]);
        let rendered = schema.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["a"]));
        assert_eq!(rendered["properties"]["note"]["type"], "string");
        assert_eq!(rendered["additionalProperties"], false);
    }
}
