//! Resolved contract document model.
//!
//! This module provides the in-memory representation of a resolved API
//! contract (OpenAPI 2.x object model). The document is produced by an
//! upstream parser that has already performed `$ref` resolution and
//! structural validation; Hypatia consumes it read-only and never parses
//! contract bytes itself.
//!
//! # Example
//!
//! ```
//! use hypatia_core::contract::ContractDocument;
//! use serde_json::json;
//!
//! let doc: ContractDocument = serde_json::from_value(json!({
//!     "basePath": "/v1",
//!     "produces": ["application/json"],
//!     "paths": {
//!         "/pets": {
//!             "get": {
//!                 "operationId": "listPets",
//!                 "parameters": [
//!                     {"name": "limit", "in": "query", "type": "integer"}
//!                 ],
//!                 "responses": {
//!                     "200": {"description": "a list of pets"}
//!                 }
//!             }
//!         }
//!     }
//! })).unwrap();
//!
//! assert_eq!(doc.base_path, "/v1");
//! assert_eq!(doc.paths.len(), 1);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operations declared on one path template, keyed by HTTP method.
///
/// Method keys are the lowercase OpenAPI keys (`get`, `post`, ...). Keys
/// outside the supported method set are carried but ignored by derivation.
pub type PathOperations = IndexMap<String, Operation>;

/// A resolved contract document.
///
/// This is the root input to route derivation. It is owned by the caller,
/// supplied once per derivation call, and never retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractDocument {
    /// Base path prepended to every path template (e.g. `/v1`).
    #[serde(default, rename = "basePath")]
    pub base_path: String,
    /// Document-level default for consumable media types.
    #[serde(default)]
    pub consumes: Vec<String>,
    /// Document-level default for producible media types.
    #[serde(default)]
    pub produces: Vec<String>,
    /// Path templates mapped to their per-method operations, in
    /// declaration order.
    #[serde(default)]
    pub paths: IndexMap<String, PathOperations>,
}

/// One HTTP method bound to one path template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Unique identifier for this operation (e.g. `getUser`). Operations
    /// without one receive a generated token during derivation.
    #[serde(default, rename = "operationId")]
    pub id: Option<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags for grouping operations.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level override of consumable media types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    /// Operation-level override of producible media types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    /// Declared parameters, in declaration order.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Declared responses keyed by numeric status string or `default`.
    #[serde(default)]
    pub responses: IndexMap<String, ResponseSpec>,
}

impl Operation {
    /// Returns the declared parameters for a given location.
    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }
}

/// Where a parameter travels within a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    /// A path template segment (e.g. `{userId}`).
    Path,
    /// A query string field.
    Query,
    /// A request header.
    Header,
    /// The request body, carrying a full nested schema.
    Body,
    /// A form field; form fields are folded into a synthesized payload schema.
    FormData,
}

impl ParameterLocation {
    /// Returns the OpenAPI `in` key for this location.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
            Self::FormData => "formData",
        }
    }
}

/// Inline-schema keys that are transport metadata, not validation
/// constraints.
const NON_CONSTRAINT_KEYS: &[&str] = &["collectionFormat", "allowEmptyValue"];

/// A declared operation parameter.
///
/// `body` parameters carry a full nested [`Parameter::schema`]; every other
/// location declares an inline primitive schema via [`Parameter::param_type`],
/// [`Parameter::format`], [`Parameter::items`] and the flattened extra
/// constraint keywords (`minimum`, `maxLength`, `pattern`, `enum`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (property key in the derived location schema).
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter must be present. Path parameters are
    /// conventionally required, but only this explicit flag is honored.
    #[serde(default)]
    pub required: bool,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Full nested schema (body parameters only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Inline primitive type (`string`, `integer`, `number`, `boolean`,
    /// `array`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    /// Inline format hint (`int64`, `date-time`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Item schema for `array`-typed inline parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    /// Remaining inline constraint keywords, carried verbatim.
    #[serde(flatten)]
    pub constraints: Map<String, Value>,
}

impl Parameter {
    /// Assembles the inline primitive schema declared by this parameter.
    ///
    /// Transport metadata keys (`collectionFormat`, `allowEmptyValue`) are
    /// not validation constraints and are left out.
    #[must_use]
    pub fn inline_schema(&self) -> Value {
        let mut schema = Map::new();
        if let Some(ty) = &self.param_type {
            schema.insert("type".to_string(), Value::String(ty.clone()));
        }
        if let Some(format) = &self.format {
            schema.insert("format".to_string(), Value::String(format.clone()));
        }
        if let Some(items) = &self.items {
            schema.insert("items".to_string(), items.clone());
        }
        for (key, value) in &self.constraints {
            if !NON_CONSTRAINT_KEYS.contains(&key.as_str()) {
                schema.insert(key.clone(), value.clone());
            }
        }
        Value::Object(schema)
    }
}

/// A declared response shape for one response key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Payload schema; absent means "any known primitive kind" after
    /// derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Response header schema; absent means a permissive open object after
    /// derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_deserialization() {
        let doc: ContractDocument = serde_json::from_value(json!({
            "basePath": "/api",
            "consumes": ["application/json"],
            "paths": {
                "/pets/{petId}": {
                    "get": {
                        "operationId": "getPet",
                        "parameters": [
                            {"name": "petId", "in": "path", "required": true, "type": "integer"}
                        ],
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(doc.base_path, "/api");
        assert_eq!(doc.consumes, vec!["application/json".to_string()]);
        let op = &doc.paths["/pets/{petId}"]["get"];
        assert_eq!(op.id.as_deref(), Some("getPet"));
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].location, ParameterLocation::Path);
        assert!(op.parameters[0].required);
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let doc: ContractDocument = serde_json::from_value(json!({})).unwrap();
        assert!(doc.base_path.is_empty());
        assert!(doc.paths.is_empty());

        let op: Operation = serde_json::from_value(json!({})).unwrap();
        assert!(op.id.is_none());
        assert!(op.parameters.is_empty());
        assert!(op.responses.is_empty());
    }

    #[test]
    fn test_parameter_location_round_trip() {
        for (location, key) in [
            (ParameterLocation::Path, "path"),
            (ParameterLocation::Query, "query"),
            (ParameterLocation::Header, "header"),
            (ParameterLocation::Body, "body"),
            (ParameterLocation::FormData, "formData"),
        ] {
            assert_eq!(location.as_str(), key);
            let parsed: ParameterLocation =
                serde_json::from_value(Value::String(key.to_string())).unwrap();
            assert_eq!(parsed, location);
        }
    }

    #[test]
    fn test_inline_schema_assembly() {
        let param: Parameter = serde_json::from_value(json!({
            "name": "limit",
            "in": "query",
            "type": "integer",
            "format": "int32",
            "minimum": 1,
            "maximum": 100,
            "collectionFormat": "csv"
        }))
        .unwrap();

        let schema = param.inline_schema();
        assert_eq!(schema["type"], "integer");
        assert_eq!(schema["format"], "int32");
        assert_eq!(schema["minimum"], 1);
        assert_eq!(schema["maximum"], 100);
        assert!(schema.get("collectionFormat").is_none());
    }

    #[test]
    fn test_parameters_in_filters_by_location() {
        let op: Operation = serde_json::from_value(json!({
            "parameters": [
                {"name": "petId", "in": "path", "required": true, "type": "integer"},
                {"name": "limit", "in": "query", "type": "integer"},
                {"name": "x-trace", "in": "header", "type": "string"}
            ]
        }))
        .unwrap();

        let query: Vec<_> = op.parameters_in(ParameterLocation::Query).collect();
        assert_eq!(query.len(), 1);
        assert_eq!(query[0].name, "limit");
        assert_eq!(op.parameters_in(ParameterLocation::Body).count(), 0);
    }
}
