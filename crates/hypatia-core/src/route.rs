//! Derived route descriptors.
//!
//! A [`Route`] is the flattened, framework-agnostic representation of one
//! contract operation: method, uri, media types, a unique identifier, and
//! the per-location validation schemas derived from the contract. Routes
//! are produced fresh on every derivation call; only compiled validators
//! persist across calls.

use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A derived route: one contract operation ready for materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Full uri: document base path plus the path template.
    pub uri: String,
    /// HTTP method.
    #[serde(with = "http_method_serde")]
    pub method: Method,
    /// Consumable media types (operation-level, falling back to the
    /// document-level default).
    pub consumes: Vec<String>,
    /// Producible media types (operation-level, falling back to the
    /// document-level default).
    pub produces: Vec<String>,
    /// Operation identifier, or a generated token unique within the
    /// derivation run.
    pub id: String,
    /// Compiled-to-be validation schemas for this route.
    pub validate: ValidateParams,
}

/// Per-location validation schemas for one route.
///
/// Each request location is independently optional: `None` means "do not
/// validate this location at all", which is deliberately distinct from
/// validating against an empty object schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateParams {
    /// Path parameter schema (`additionalProperties: false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Query parameter schema (`additionalProperties: false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Header schema (`additionalProperties: true`; intermediaries add
    /// headers of their own).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    /// Payload schema: the body schema verbatim, or a schema synthesized
    /// from `formData` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Response rules keyed by status string, always containing a `default`
    /// entry after derivation.
    #[serde(default)]
    pub responses: IndexMap<String, ResponseRules>,
}

impl ValidateParams {
    /// Looks up the response rules for a status code, falling back to the
    /// `default` entry.
    #[must_use]
    pub fn response_rules(&self, status: u16) -> Option<&ResponseRules> {
        self.responses
            .get(status.to_string().as_str())
            .or_else(|| self.responses.get(Route::DEFAULT_RESPONSE_KEY))
    }
}

/// The `{payload, headers}` schema pair validated against one response key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRules {
    /// Response payload schema.
    pub payload: Value,
    /// Response header schema.
    pub headers: Value,
}

impl Route {
    /// Response key applied when no declared status matches.
    pub const DEFAULT_RESPONSE_KEY: &'static str = "default";

    /// Returns the composite lookup key `"<METHOD> <uri>"` used as the
    /// second tier of handler resolution.
    #[must_use]
    pub fn composite_key(&self) -> String {
        format!("{} {}", self.method, self.uri)
    }
}

/// Serde support for HTTP methods.
mod http_method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(method: &Method, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Method, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_route() -> Route {
        let mut responses = IndexMap::new();
        responses.insert(
            Route::DEFAULT_RESPONSE_KEY.to_string(),
            ResponseRules {
                payload: json!({}),
                headers: json!({}),
            },
        );
        responses.insert(
            "200".to_string(),
            ResponseRules {
                payload: json!({"type": "object"}),
                headers: json!({"type": "object", "additionalProperties": true}),
            },
        );

        Route {
            uri: "/v1/pets".to_string(),
            method: Method::GET,
            consumes: vec!["application/json".to_string()],
            produces: vec!["application/json".to_string()],
            id: "listPets".to_string(),
            validate: ValidateParams {
                responses,
                ..ValidateParams::default()
            },
        }
    }

    #[test]
    fn test_composite_key() {
        let route = create_test_route();
        assert_eq!(route.composite_key(), "GET /v1/pets");
    }

    #[test]
    fn test_response_rules_lookup_by_status() {
        let route = create_test_route();
        let rules = route.validate.response_rules(200).unwrap();
        assert_eq!(rules.payload, json!({"type": "object"}));
    }

    #[test]
    fn test_response_rules_fall_back_to_default() {
        let route = create_test_route();
        let rules = route.validate.response_rules(503).unwrap();
        assert_eq!(rules.payload, json!({}));
    }

    #[test]
    fn test_route_serialization_round_trip() {
        let route = create_test_route();
        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(value["method"], "GET");

        let parsed: Route = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.method, Method::GET);
        assert_eq!(parsed.id, "listPets");
    }
}
