//! Schema compilation and execution.
//!
//! A [`Validator`] is a compiled form of one JSON Schema, built once and
//! executed many times. Validation always runs against a deep copy of the
//! input: coercion and defaulting may alter values, and caller-owned data
//! is never mutated in place.
//!
//! The supported keyword subset is the one route derivation emits plus what
//! contract body schemas commonly use: `type` (string or array),
//! `properties`, `required`, `additionalProperties`, `items`, `anyOf`,
//! `enum`, `minimum`, `maximum`, `minLength`, `maxLength`, `pattern`,
//! `minItems`, `maxItems` and `default`. Unknown keywords are ignored.

use hypatia_core::Violation;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

/// Per-call-site validation behavior.
///
/// Coercion and defaulting are opt-in: request locations arrive as raw
/// strings and want both, while response validation must not silently
/// rewrite a handler's own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Coerce string values into their declared numeric/boolean types.
    pub coerce: bool,
    /// Insert schema-level defaults for omitted fields into the output.
    pub apply_defaults: bool,
}

impl ValidateOptions {
    /// Options for request-location validation: coerce and apply defaults.
    #[must_use]
    pub const fn for_request() -> Self {
        Self {
            coerce: true,
            apply_defaults: true,
        }
    }

    /// Options for response validation: validate verbatim, rewrite nothing.
    #[must_use]
    pub const fn for_response() -> Self {
        Self {
            coerce: false,
            apply_defaults: false,
        }
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self::for_response()
    }
}

/// A compiled, reusable matcher for one JSON Schema.
#[derive(Debug)]
pub struct Validator {
    root: Compiled,
}

impl Validator {
    /// Compiles a schema into an executable validator.
    ///
    /// Compilation never fails: contracts are structurally validated
    /// upstream, so a malformed keyword (e.g. an unparseable `pattern`)
    /// drops that constraint with a warning instead of erroring.
    #[must_use]
    pub fn compile(schema: &Value) -> Self {
        Self {
            root: Compiled::compile(schema),
        }
    }

    /// Validates `input` and returns the (possibly coerced and defaulted)
    /// output, or every violation found.
    ///
    /// The input itself is never mutated.
    pub fn validate(&self, input: &Value, options: &ValidateOptions) -> Result<Value, Vec<Violation>> {
        let mut output = input.clone();
        let mut violations = Vec::new();
        self.root.check(&mut output, "$", options, &mut violations);
        if violations.is_empty() {
            Ok(output)
        } else {
            Err(violations)
        }
    }
}

/// One compiled schema node.
#[derive(Debug)]
struct Compiled {
    kind: CompiledKind,
    enumeration: Option<Vec<Value>>,
    default: Option<Value>,
}

#[derive(Debug)]
enum CompiledKind {
    Any,
    Types(Vec<SimpleType>),
    Object {
        properties: IndexMap<String, Compiled>,
        required: Vec<String>,
        additional: bool,
    },
    Array {
        items: Option<Box<Compiled>>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Str {
        min_length: Option<u64>,
        max_length: Option<u64>,
        pattern: Option<Regex>,
    },
    Int {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Num {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Bool,
    Null,
    AnyOf(Vec<Compiled>),
}

/// A bare type name from a `type` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimpleType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl SimpleType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => is_integer(value),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Null => value.is_null(),
        }
    }
}

impl Compiled {
    fn compile(schema: &Value) -> Self {
        let Some(obj) = schema.as_object() else {
            // `true` and other non-object schemas accept anything.
            return Self {
                kind: CompiledKind::Any,
                enumeration: None,
                default: None,
            };
        };

        let enumeration = obj
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| values.to_vec());
        let default = obj.get("default").cloned();

        let kind = if let Some(branches) = obj.get("anyOf").and_then(Value::as_array) {
            CompiledKind::AnyOf(branches.iter().map(Self::compile).collect())
        } else {
            match obj.get("type") {
                Some(Value::String(name)) => Self::compile_typed(name, obj),
                Some(Value::Array(names)) => CompiledKind::Types(
                    names
                        .iter()
                        .filter_map(Value::as_str)
                        .filter_map(SimpleType::parse)
                        .collect(),
                ),
                // No `type`: infer object/array shape from the keywords present.
                _ if obj.contains_key("properties")
                    || obj.contains_key("required")
                    || obj.contains_key("additionalProperties") =>
                {
                    Self::compile_object(obj)
                }
                _ if obj.contains_key("items") => Self::compile_array(obj),
                _ => CompiledKind::Any,
            }
        };

        Self {
            kind,
            enumeration,
            default,
        }
    }

    fn compile_typed(name: &str, obj: &Map<String, Value>) -> CompiledKind {
        match name {
            "object" => Self::compile_object(obj),
            "array" => Self::compile_array(obj),
            "string" => CompiledKind::Str {
                min_length: obj.get("minLength").and_then(Value::as_u64),
                max_length: obj.get("maxLength").and_then(Value::as_u64),
                pattern: obj
                    .get("pattern")
                    .and_then(Value::as_str)
                    .and_then(compile_pattern),
            },
            "integer" => CompiledKind::Int {
                minimum: obj.get("minimum").and_then(Value::as_i64),
                maximum: obj.get("maximum").and_then(Value::as_i64),
            },
            "number" => CompiledKind::Num {
                minimum: obj.get("minimum").and_then(Value::as_f64),
                maximum: obj.get("maximum").and_then(Value::as_f64),
            },
            "boolean" => CompiledKind::Bool,
            "null" => CompiledKind::Null,
            other => {
                warn!(schema_type = other, "unknown schema type, accepting any value");
                CompiledKind::Any
            }
        }
    }

    fn compile_object(obj: &Map<String, Value>) -> CompiledKind {
        let properties = obj
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, schema)| (name.clone(), Self::compile(schema)))
                    .collect::<IndexMap<_, _>>()
            })
            .unwrap_or_default();

        let required = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        // Only a literal `false` closes the object; schema-valued
        // additionalProperties is treated as permissive.
        let additional = obj
            .get("additionalProperties")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        CompiledKind::Object {
            properties,
            required,
            additional,
        }
    }

    fn compile_array(obj: &Map<String, Value>) -> CompiledKind {
        CompiledKind::Array {
            items: obj.get("items").map(|items| Box::new(Self::compile(items))),
            min_items: obj.get("minItems").and_then(Value::as_u64),
            max_items: obj.get("maxItems").and_then(Value::as_u64),
        }
    }

    fn check(
        &self,
        value: &mut Value,
        path: &str,
        options: &ValidateOptions,
        violations: &mut Vec<Violation>,
    ) {
        let before = violations.len();
        self.kind.check(value, path, options, violations);

        // `enum` only applies once the value satisfied its type and
        // constraints; coerced values are compared in coerced form.
        if violations.len() == before {
            if let Some(allowed) = &self.enumeration {
                if !allowed.contains(value) {
                    violations.push(Violation::new(
                        path,
                        "enum",
                        "value is not one of the allowed values",
                    ));
                }
            }
        }
    }
}

impl CompiledKind {
    fn check(
        &self,
        value: &mut Value,
        path: &str,
        options: &ValidateOptions,
        violations: &mut Vec<Violation>,
    ) {
        match self {
            Self::Any => {}

            Self::Types(types) => {
                if !types.iter().any(|t| t.matches(value)) {
                    violations.push(Violation::new(
                        path,
                        "type",
                        format!("{} is not one of the allowed types", type_name(value)),
                    ));
                }
            }

            Self::Object {
                properties,
                required,
                additional,
            } => Self::check_object(
                value, path, options, violations, properties, required, *additional,
            ),

            Self::Array {
                items,
                min_items,
                max_items,
            } => {
                Self::check_array(value, path, options, violations, items.as_deref(), *min_items, *max_items);
            }

            Self::Str {
                min_length,
                max_length,
                pattern,
            } => {
                let Some(s) = value.as_str() else {
                    violations.push(type_violation(path, "string", value));
                    return;
                };
                if let Some(min) = min_length {
                    if (s.chars().count() as u64) < *min {
                        violations.push(Violation::new(
                            path,
                            "minLength",
                            format!("string is shorter than minimum length {}", min),
                        ));
                    }
                }
                if let Some(max) = max_length {
                    if (s.chars().count() as u64) > *max {
                        violations.push(Violation::new(
                            path,
                            "maxLength",
                            format!("string is longer than maximum length {}", max),
                        ));
                    }
                }
                if let Some(pattern) = pattern {
                    if !pattern.is_match(s) {
                        violations.push(Violation::new(
                            path,
                            "pattern",
                            format!("string does not match pattern '{}'", pattern.as_str()),
                        ));
                    }
                }
            }

            Self::Int { minimum, maximum } => {
                if options.coerce {
                    if let Some(parsed) = value.as_str().and_then(|s| s.parse::<i64>().ok()) {
                        *value = Value::from(parsed);
                    }
                }
                let n = if let Some(n) = value.as_i64() {
                    n
                } else if let Some(f) = value.as_f64().filter(|f| f.fract() == 0.0) {
                    f as i64
                } else {
                    violations.push(type_violation(path, "integer", value));
                    return;
                };
                if let Some(min) = minimum {
                    if n < *min {
                        violations.push(Violation::new(
                            path,
                            "minimum",
                            format!("value {} is less than minimum {}", n, min),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        violations.push(Violation::new(
                            path,
                            "maximum",
                            format!("value {} is greater than maximum {}", n, max),
                        ));
                    }
                }
            }

            Self::Num { minimum, maximum } => {
                if options.coerce {
                    if let Some(parsed) = value
                        .as_str()
                        .and_then(|s| s.parse::<f64>().ok())
                        .filter(|f| f.is_finite())
                        .and_then(serde_json::Number::from_f64)
                    {
                        *value = Value::Number(parsed);
                    }
                }
                let Some(f) = value.as_f64() else {
                    violations.push(type_violation(path, "number", value));
                    return;
                };
                if let Some(min) = minimum {
                    if f < *min {
                        violations.push(Violation::new(
                            path,
                            "minimum",
                            format!("value {} is less than minimum {}", f, min),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if f > *max {
                        violations.push(Violation::new(
                            path,
                            "maximum",
                            format!("value {} is greater than maximum {}", f, max),
                        ));
                    }
                }
            }

            Self::Bool => {
                if options.coerce {
                    match value.as_str() {
                        Some("true") => *value = Value::Bool(true),
                        Some("false") => *value = Value::Bool(false),
                        _ => {}
                    }
                }
                if !value.is_boolean() {
                    violations.push(type_violation(path, "boolean", value));
                }
            }

            Self::Null => {
                if !value.is_null() {
                    violations.push(type_violation(path, "null", value));
                }
            }

            Self::AnyOf(branches) => {
                for branch in branches {
                    let mut candidate = value.clone();
                    let mut branch_violations = Vec::new();
                    branch.check(&mut candidate, path, options, &mut branch_violations);
                    if branch_violations.is_empty() {
                        *value = candidate;
                        return;
                    }
                }
                violations.push(Violation::new(
                    path,
                    "anyOf",
                    format!("value does not match any of {} allowed schemas", branches.len()),
                ));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_object(
        value: &mut Value,
        path: &str,
        options: &ValidateOptions,
        violations: &mut Vec<Violation>,
        properties: &IndexMap<String, Compiled>,
        required: &[String],
        additional: bool,
    ) {
        let Some(obj) = value.as_object_mut() else {
            violations.push(type_violation(path, "object", value));
            return;
        };

        // Defaults first, so a required field with a default is satisfied.
        if options.apply_defaults {
            for (name, prop) in properties {
                if let Some(default) = &prop.default {
                    if !obj.contains_key(name) {
                        obj.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        for name in required {
            if !obj.contains_key(name) {
                violations.push(Violation::new(
                    format!("{}.{}", path, name),
                    "required",
                    format!("missing required property '{}'", name),
                ));
            }
        }

        if !additional {
            for key in obj.keys() {
                if !properties.contains_key(key) {
                    violations.push(Violation::new(
                        format!("{}.{}", path, key),
                        "additionalProperties",
                        format!("unknown property '{}'", key),
                    ));
                }
            }
        }

        for (name, prop) in properties {
            if let Some(prop_value) = obj.get_mut(name) {
                let prop_path = format!("{}.{}", path, name);
                prop.check(prop_value, &prop_path, options, violations);
            }
        }
    }

    fn check_array(
        value: &mut Value,
        path: &str,
        options: &ValidateOptions,
        violations: &mut Vec<Violation>,
        items: Option<&Compiled>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    ) {
        let Some(arr) = value.as_array_mut() else {
            violations.push(type_violation(path, "array", value));
            return;
        };

        if let Some(min) = min_items {
            if (arr.len() as u64) < min {
                violations.push(Violation::new(
                    path,
                    "minItems",
                    format!("array has fewer than {} items", min),
                ));
            }
        }
        if let Some(max) = max_items {
            if (arr.len() as u64) > max {
                violations.push(Violation::new(
                    path,
                    "maxItems",
                    format!("array has more than {} items", max),
                ));
            }
        }

        if let Some(items) = items {
            for (idx, item) in arr.iter_mut().enumerate() {
                let item_path = format!("{}[{}]", path, idx);
                items.check(item, &item_path, options, violations);
            }
        }
    }
}

fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(error) => {
            warn!(pattern, %error, "invalid pattern in schema, constraint dropped");
            None
        }
    }
}

fn is_integer(value: &Value) -> bool {
    value.as_i64().is_some()
        || value.as_u64().is_some()
        || value.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn type_violation(path: &str, expected: &str, value: &Value) -> Violation {
    Violation::new(
        path,
        "type",
        format!("expected {}, got {}", expected, type_name(value)),
    )
}

/// Returns a human-readable name for a JSON value type.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_empty_schema_accepts_anything() {
        let validator = Validator::compile(&json!({}));
        let options = ValidateOptions::for_response();
        assert!(validator.validate(&json!({"a": 1}), &options).is_ok());
        assert!(validator.validate(&json!("anything"), &options).is_ok());
        assert!(validator.validate(&json!(null), &options).is_ok());
    }

    #[test]
    fn test_object_required_and_types() {
        let validator = Validator::compile(&json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer", "minimum": 0}
            },
            "required": ["name"]
        }));
        let options = ValidateOptions::for_response();

        assert!(validator
            .validate(&json!({"name": "Rex", "age": 3}), &options)
            .is_ok());

        let violations = validator.validate(&json!({"age": 3}), &options).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, "required");
        assert!(violations[0].path.contains("name"));

        let violations = validator
            .validate(&json!({"name": "Rex", "age": -1}), &options)
            .unwrap_err();
        assert_eq!(violations[0].constraint, "minimum");
    }

    #[test]
    fn test_all_violations_reported() {
        let validator = Validator::compile(&json!({
            "type": "object",
            "properties": {
                "a": {"type": "integer"},
                "b": {"type": "string"}
            },
            "required": ["a", "b"]
        }));

        let violations = validator
            .validate(&json!({}), &ValidateOptions::for_response())
            .unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_additional_properties_false() {
        let validator = Validator::compile(&json!({
            "type": "object",
            "properties": {"limit": {"type": "integer"}},
            "additionalProperties": false
        }));

        let violations = validator
            .validate(&json!({"limit": 1, "stray": true}), &ValidateOptions::for_response())
            .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, "additionalProperties");
        assert!(violations[0].path.contains("stray"));
    }

    #[test]
    fn test_coercion_is_opt_in() {
        let validator = Validator::compile(&json!({"type": "integer"}));

        let coerced = validator
            .validate(&json!("42"), &ValidateOptions::for_request())
            .unwrap();
        assert_eq!(coerced, json!(42));

        assert!(validator
            .validate(&json!("42"), &ValidateOptions::for_response())
            .is_err());
        assert!(validator
            .validate(&json!("abc"), &ValidateOptions::for_request())
            .is_err());
    }

    #[test]
    fn test_number_coercion() {
        let validator = Validator::compile(&json!({"type": "number"}));
        let options = ValidateOptions::for_request();

        assert_eq!(validator.validate(&json!("3.14"), &options).unwrap(), json!(3.14));
        assert!(validator.validate(&json!("abc"), &options).is_err());
        assert!(validator.validate(&json!("inf"), &options).is_err());
    }

    #[test]
    fn test_boolean_coercion() {
        let validator = Validator::compile(&json!({"type": "boolean"}));
        let options = ValidateOptions::for_request();

        assert_eq!(validator.validate(&json!("true"), &options).unwrap(), json!(true));
        assert_eq!(validator.validate(&json!("false"), &options).unwrap(), json!(false));
        assert!(validator.validate(&json!("yes"), &options).is_err());
    }

    #[test]
    fn test_input_is_never_mutated() {
        let validator = Validator::compile(&json!({
            "type": "object",
            "properties": {"limit": {"type": "integer", "default": 20}}
        }));
        let input = json!({});

        let output = validator
            .validate(&input, &ValidateOptions::for_request())
            .unwrap();
        assert_eq!(output, json!({"limit": 20}));
        assert_eq!(input, json!({}));
    }

    #[test]
    fn test_defaults_satisfy_required() {
        let validator = Validator::compile(&json!({
            "type": "object",
            "properties": {"page": {"type": "integer", "default": 1}},
            "required": ["page"]
        }));

        assert!(validator
            .validate(&json!({}), &ValidateOptions::for_request())
            .is_ok());
        assert!(validator
            .validate(&json!({}), &ValidateOptions::for_response())
            .is_err());
    }

    #[test]
    fn test_any_of_first_match_wins() {
        let validator = Validator::compile(&json!({
            "anyOf": [
                {"type": "integer"},
                {"type": "string", "pattern": "^-?\\d+$"}
            ]
        }));

        // Without coercion the string branch still accepts numeric strings.
        let options = ValidateOptions::for_response();
        assert!(validator.validate(&json!(7), &options).is_ok());
        assert!(validator.validate(&json!("7"), &options).is_ok());

        let violations = validator.validate(&json!("abc"), &options).unwrap_err();
        assert_eq!(violations[0].constraint, "anyOf");

        // With coercion the numeric branch converts the string.
        let coerced = validator
            .validate(&json!("7"), &ValidateOptions::for_request())
            .unwrap();
        assert_eq!(coerced, json!(7));
    }

    #[test]
    fn test_type_array() {
        let validator = Validator::compile(&json!({
            "type": ["string", "number", "integer", "boolean", "array", "object", "null"]
        }));
        let options = ValidateOptions::for_response();

        for value in [json!("x"), json!(1), json!(1.5), json!(true), json!([]), json!({}), json!(null)] {
            assert!(validator.validate(&value, &options).is_ok());
        }
    }

    #[test]
    fn test_enum_checked_after_coercion() {
        let validator = Validator::compile(&json!({"type": "integer", "enum": [1, 2, 3]}));

        assert!(validator
            .validate(&json!("2"), &ValidateOptions::for_request())
            .is_ok());
        let violations = validator
            .validate(&json!("9"), &ValidateOptions::for_request())
            .unwrap_err();
        assert_eq!(violations[0].constraint, "enum");
    }

    #[test]
    fn test_string_constraints() {
        let validator = Validator::compile(&json!({
            "type": "string",
            "minLength": 2,
            "maxLength": 5,
            "pattern": "^[a-z]+$"
        }));
        let options = ValidateOptions::for_response();

        assert!(validator.validate(&json!("abc"), &options).is_ok());
        assert!(validator.validate(&json!("a"), &options).is_err());
        assert!(validator.validate(&json!("abcdef"), &options).is_err());
        assert!(validator.validate(&json!("ABC"), &options).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_dropped() {
        let validator = Validator::compile(&json!({"type": "string", "pattern": "(unclosed"}));
        assert!(validator
            .validate(&json!("anything"), &ValidateOptions::for_response())
            .is_ok());
    }

    #[test]
    fn test_nested_violation_paths() {
        let validator = Validator::compile(&json!({
            "type": "object",
            "properties": {
                "pets": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                        "required": ["name"]
                    }
                }
            }
        }));

        let violations = validator
            .validate(
                &json!({"pets": [{"name": "Rex"}, {}]}),
                &ValidateOptions::for_response(),
            )
            .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "$.pets[1].name");
    }

    #[test]
    fn test_array_item_constraints() {
        let validator = Validator::compile(&json!({
            "type": "array",
            "items": {"type": "integer"},
            "minItems": 1,
            "maxItems": 3
        }));
        let options = ValidateOptions::for_response();

        assert!(validator.validate(&json!([1, 2]), &options).is_ok());
        assert!(validator.validate(&json!([]), &options).is_err());
        assert!(validator.validate(&json!([1, 2, 3, 4]), &options).is_err());
        assert!(validator.validate(&json!([1, "two"]), &options).is_err());
    }

    proptest! {
        #[test]
        fn prop_integer_strings_coerce(n in any::<i64>()) {
            let validator = Validator::compile(&json!({"type": "integer"}));
            let output = validator
                .validate(&json!(n.to_string()), &ValidateOptions::for_request())
                .unwrap();
            prop_assert_eq!(output, json!(n));
        }

        #[test]
        fn prop_non_numeric_strings_rejected(s in "[a-zA-Z]{1,12}") {
            prop_assume!(s.parse::<i64>().is_err());
            let validator = Validator::compile(&json!({"type": "integer"}));
            prop_assert!(validator
                .validate(&json!(s), &ValidateOptions::for_request())
                .is_err());
        }
    }
}
