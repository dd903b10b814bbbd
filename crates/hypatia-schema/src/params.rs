//! Location schema construction.
//!
//! Path, query, header and form parameters are flattened into one JSON
//! Schema per location, of shape `{type: object, properties, required,
//! additionalProperties}`. Because path, query and header values arrive
//! over HTTP as raw strings, numeric parameter schemas are widened into an
//! `anyOf` of the strict numeric shape and a numeric-string pattern, so
//! `"42"` satisfies an `integer` parameter while `"abc"` still fails.

use hypatia_core::Parameter;
use serde_json::{json, Map, Value};

/// Strings that round-trip into an integer.
const INTEGER_PATTERN: &str = r"^-?\d+$";
/// Strings that round-trip into a number.
const NUMBER_PATTERN: &str = r"^-?\d+(\.\d+)?([eE][+-]?\d+)?$";

/// Builds the object schema for one request location.
///
/// Returns `None` when the location has no parameters: an absent schema
/// means "do not validate this location at all", which is not the same as
/// requiring an empty object.
pub(crate) fn location_schema(params: &[&Parameter], additional_properties: bool) -> Option<Value> {
    if params.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in params {
        properties.insert(param.name.clone(), coercible_schema(param.inline_schema()));
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema.insert(
        "additionalProperties".to_string(),
        Value::Bool(additional_properties),
    );
    Some(Value::Object(schema))
}

/// Widens a parameter schema for string-transport tolerance.
///
/// Numeric types accept either the strict shape or a string that coerces
/// into it; arrays accept either the array form or a single declared item
/// (transports deliver single-value query arrays unwrapped). Everything
/// else passes through verbatim.
pub(crate) fn coercible_schema(schema: Value) -> Value {
    match schema.get("type").and_then(Value::as_str) {
        Some("integer") => json!({
            "anyOf": [schema, {"type": "string", "pattern": INTEGER_PATTERN}]
        }),
        Some("number") => json!({
            "anyOf": [schema, {"type": "string", "pattern": NUMBER_PATTERN}]
        }),
        Some("array") => {
            let single = schema.get("items").cloned().map(coercible_schema);
            let mut branches = vec![schema];
            if let Some(single) = single {
                branches.push(single);
            }
            json!({ "anyOf": branches })
        }
        _ => schema,
    }
}
