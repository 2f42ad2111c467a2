//! Request validation — checks tool input against the descriptor's schema.
//!
//! Stops at the first violation. Never touches the handler.

use crate::tools::schema::{value_type_name, InputSchema};
use crate::tools::ToolDescriptor;
use crate::types::{Error, Result};
use serde_json::Value;

/// Validate `input` against `descriptor`'s input schema.
pub fn validate(input: &Value, descriptor: &ToolDescriptor) -> Result<()> {
    validate_input(input, descriptor.input_schema())
}

/// Validate `input` against a schema.
///
/// For parameter lists the order of checks is: input must be an object, then
/// each declared parameter in declaration order (presence, then type), then
/// unknown keys.
pub fn validate_input(input: &Value, schema: &InputSchema) -> Result<()> {
    match schema {
        InputSchema::Params(params) => {
            let map = input.as_object().ok_or_else(|| {
                Error::schema(
                    "input",
                    format!("expected object, got {}", value_type_name(input)),
                )
            })?;

            for param in params {
                match map.get(&param.name) {
                    None if param.is_required() => {
                        return Err(Error::schema(&param.name, "missing required field"));
                    }
                    None => {}
                    Some(value) => param
                        .param_type
                        .validate(value)
                        .map_err(|reason| Error::schema(&param.name, reason))?,
                }
            }

            if let Some(unknown) = map
                .keys()
                .find(|key| !params.iter().any(|p| &p.name == *key))
            {
                return Err(Error::schema(unknown, "unknown field"));
            }
            Ok(())
        }
        InputSchema::JsonSchema(compiled) => match compiled.first_violation(input) {
            Some((field, reason)) => Err(Error::schema(field, reason)),
            None => Ok(()),
        },
    }
}
