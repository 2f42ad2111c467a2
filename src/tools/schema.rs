//! Tool input schemas — typed parameter lists or compiled JSON Schema documents.

use crate::types::{Error, Result};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Int,
    Float,
    Bool,
    StringList,
    Enum(Vec<String>),
    Optional(Box<ParamType>),
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            ParamType::String => expect(value.is_string(), "string", value),
            ParamType::Int => expect(value.is_i64() || value.is_u64(), "integer", value),
            ParamType::Float => expect(value.is_number(), "number", value),
            ParamType::Bool => expect(value.is_boolean(), "boolean", value),
            ParamType::StringList => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| format!("expected array, got {}", value_type_name(value)))?;
                for (i, item) in arr.iter().enumerate() {
                    if !item.is_string() {
                        return Err(format!(
                            "expected string at index {}, got {}",
                            i,
                            value_type_name(item)
                        ));
                    }
                }
                Ok(())
            }
            ParamType::Enum(variants) => {
                let s = value.as_str().ok_or_else(|| {
                    format!("expected string for enum, got {}", value_type_name(value))
                })?;
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(format!(
                        "invalid enum value '{}', expected one of: {}",
                        s,
                        variants.join(", ")
                    ))
                }
            }
            ParamType::Optional(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate(value)
                }
            }
        }
    }

    /// JSON Schema fragment for this type.
    pub fn to_json_schema(&self) -> Value {
        match self {
            ParamType::String => json!({"type": "string"}),
            ParamType::Int => json!({"type": "integer"}),
            ParamType::Float => json!({"type": "number"}),
            ParamType::Bool => json!({"type": "boolean"}),
            ParamType::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamType::Enum(variants) => json!({"type": "string", "enum": variants}),
            ParamType::Optional(inner) => json!({"anyOf": [inner.to_json_schema(), {"type": "null"}]}),
        }
    }
}

fn expect(ok: bool, expected: &str, value: &Value) -> std::result::Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(format!("expected {}, got {}", expected, value_type_name(value)))
    }
}

pub(crate) fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self::required(name, ParamType::Optional(Box::new(param_type)), description)
    }

    pub fn is_required(&self) -> bool {
        !matches!(self.param_type, ParamType::Optional(_))
    }
}

// =============================================================================
// Input schema
// =============================================================================

/// Declarative shape of a tool's accepted input.
#[derive(Clone)]
pub enum InputSchema {
    /// Object with exactly these parameters; unknown keys are rejected.
    Params(Vec<ParamDef>),
    /// Arbitrary JSON Schema, compiled once.
    JsonSchema(CompiledSchema),
}

impl InputSchema {
    /// Schema accepting only the empty object.
    pub fn empty() -> Self {
        InputSchema::Params(Vec::new())
    }

    /// Compile a JSON Schema document. Fails if the document itself is invalid.
    pub fn json_schema(document: Value) -> Result<Self> {
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| Error::invalid_descriptor(format!("invalid JSON schema: {}", e)))?;
        Ok(InputSchema::JsonSchema(CompiledSchema {
            document,
            validator: Arc::new(validator),
        }))
    }

    /// Render as a JSON Schema document, for catalog listings.
    pub fn to_json_schema(&self) -> Value {
        match self {
            InputSchema::Params(params) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for p in params {
                    let mut prop = p.param_type.to_json_schema();
                    if let Some(obj) = prop.as_object_mut() {
                        obj.insert("description".to_string(), json!(p.description));
                    }
                    properties.insert(p.name.clone(), prop);
                    if p.is_required() {
                        required.push(p.name.clone());
                    }
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false,
                })
            }
            InputSchema::JsonSchema(compiled) => compiled.document.clone(),
        }
    }
}

impl fmt::Debug for InputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSchema::Params(params) => f.debug_tuple("Params").field(params).finish(),
            InputSchema::JsonSchema(compiled) => f
                .debug_tuple("JsonSchema")
                .field(&compiled.document)
                .finish(),
        }
    }
}

/// JSON Schema document with its compiled validator.
#[derive(Clone)]
pub struct CompiledSchema {
    document: Value,
    validator: Arc<jsonschema::Validator>,
}

impl CompiledSchema {
    /// First violation as `(field, reason)`; the root is reported as `input`.
    pub(crate) fn first_violation(&self, input: &Value) -> Option<(String, String)> {
        self.validator.iter_errors(input).next().map(|err| {
            let path = err.instance_path.to_string();
            let field = match path.trim_start_matches('/') {
                "" => "input".to_string(),
                rest => rest.replace('/', "."),
            };
            (field, err.to_string())
        })
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}
