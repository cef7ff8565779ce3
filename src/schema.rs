//! Minimal argument schema for tool inputs and its JSON Schema rendering.

use serde_json::{json, Map, Value};

/// Shape of a tool argument. Only the variants with a direct JSON Schema
/// mapping are rendered precisely; the rest render as a bare object.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSchema {
    String,
    Number,
    Boolean,
    Array(Box<ArgSchema>),
    Object(Vec<(&'static str, ArgSchema)>),
    Optional(Box<ArgSchema>),
    /// String-keyed map with values of the inner shape.
    Record(Box<ArgSchema>),
}

impl ArgSchema {
    pub fn array(item: ArgSchema) -> Self {
        Self::Array(Box::new(item))
    }

    pub fn optional(inner: ArgSchema) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn record(value: ArgSchema) -> Self {
        Self::Record(Box::new(value))
    }

    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Number => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Array(item) => json!({"type": "array", "items": item.to_json_schema()}),
            Self::Object(fields) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for (name, field) in fields {
                    properties.insert(name.to_string(), field.to_json_schema());
                    if !matches!(field, Self::Optional(_)) {
                        required.push(Value::from(*name));
                    }
                }
                json!({"type": "object", "properties": properties, "required": required})
            }
            Self::Optional(inner) => inner.to_json_schema(),
            _ => json!({"type": "object"}),
        }
    }
}
