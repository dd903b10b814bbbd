//! Request and response validation hooks for materialized routes.
//!
//! A [`RouteValidation`] bundles one route's derived schemas with the
//! shared validator cache and executes them at request/response time.
//! Request-location failures are the caller's fault and map to a 400
//! rejection; a response-shape mismatch means the handler violated its own
//! declared contract, which is the implementer's bug and maps to a 500.

use std::sync::Arc;

use http::StatusCode;
use hypatia_core::{SchemaLocation, ValidateParams};
use hypatia_validate::{ValidateError, ValidateOptions, ValidatorCache};
use serde_json::{json, Map, Value};
use tracing::warn;

/// The raw per-location values of one inbound request.
///
/// Locations arrive as JSON objects of raw transport values (strings,
/// mostly); validation returns them in coerced and defaulted form.
#[derive(Debug, Clone)]
pub struct RequestParts {
    /// Extracted path parameters.
    pub params: Value,
    /// Query string fields.
    pub query: Value,
    /// Request headers.
    pub headers: Value,
    /// Parsed request payload, if any.
    pub payload: Option<Value>,
}

impl Default for RequestParts {
    fn default() -> Self {
        Self {
            params: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            headers: Value::Object(Map::new()),
            payload: None,
        }
    }
}

/// Validation hooks for one materialized route.
#[derive(Debug)]
pub struct RouteValidation {
    cache: Arc<ValidatorCache>,
    rules: ValidateParams,
}

impl RouteValidation {
    /// Binds a route's derived rules to the shared validator cache.
    #[must_use]
    pub fn new(cache: Arc<ValidatorCache>, rules: ValidateParams) -> Self {
        Self { cache, rules }
    }

    /// Returns the derived rules this route validates against.
    #[must_use]
    pub fn rules(&self) -> &ValidateParams {
        &self.rules
    }

    /// Validates every request location that carries a schema.
    ///
    /// Locations without a schema are not validated at all. The returned
    /// parts carry coerced values and applied defaults; the input is left
    /// untouched. The first failing location rejects the request with a
    /// 400 carrying the full violation list.
    pub fn validate_request(&self, request: &RequestParts) -> Result<RequestParts, Rejection> {
        let options = ValidateOptions::for_request();
        let mut validated = request.clone();

        if let Some(schema) = &self.rules.params {
            validated.params =
                self.run_request(schema, &request.params, SchemaLocation::Params, &options)?;
        }
        if let Some(schema) = &self.rules.query {
            validated.query =
                self.run_request(schema, &request.query, SchemaLocation::Query, &options)?;
        }
        if let Some(schema) = &self.rules.headers {
            validated.headers =
                self.run_request(schema, &request.headers, SchemaLocation::Headers, &options)?;
        }
        if let Some(schema) = &self.rules.payload {
            // A missing payload is validated as null so a required body
            // fails instead of going unchecked.
            let payload = request.payload.clone().unwrap_or(Value::Null);
            validated.payload =
                Some(self.run_request(schema, &payload, SchemaLocation::Payload, &options)?);
        }

        Ok(validated)
    }

    /// Validates a handler's response against the rules for its status
    /// code, falling back to the `default` entry.
    ///
    /// Responses are validated verbatim: no coercion, no defaulting.
    pub fn validate_response(
        &self,
        status: u16,
        payload: &Value,
        headers: &Value,
    ) -> Result<(), Rejection> {
        let Some(rules) = self.rules.response_rules(status) else {
            // Hand-assembled rules without a default entry; derivation
            // always injects one.
            return Ok(());
        };

        let location = SchemaLocation::Response(status.to_string());
        let options = ValidateOptions::for_response();

        self.cache
            .validate(&rules.payload, payload, location.clone(), &options)
            .and_then(|_| self.cache.validate(&rules.headers, headers, location, &options))
            .map_err(|error| {
                warn!(location = %error.location(), %error, "response violates declared contract");
                Rejection::internal(error)
            })?;

        Ok(())
    }

    fn run_request(
        &self,
        schema: &Value,
        input: &Value,
        location: SchemaLocation,
        options: &ValidateOptions,
    ) -> Result<Value, Rejection> {
        self.cache
            .validate(schema, input, location, options)
            .map_err(|error| {
                warn!(location = %error.location(), %error, "request validation failed");
                Rejection::bad_request(error)
            })
    }
}

/// A terminal validation outcome for one request or response.
#[derive(Debug, Clone)]
pub struct Rejection {
    /// Status the framework should answer with.
    pub status: StatusCode,
    /// The underlying validation failure.
    pub error: ValidateError,
}

impl Rejection {
    /// A client-error rejection (request location failed).
    #[must_use]
    pub fn bad_request(error: ValidateError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// A server-error rejection (handler output violated its contract).
    #[must_use]
    pub fn internal(error: ValidateError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }

    /// Serializable failure payload echoing the source location and the
    /// violation list.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({
            "status": self.status.as_u16(),
            "message": self.error.to_string(),
            "location": self.error.location(),
            "errors": self.error.violations(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypatia_core::{ResponseRules, Route};
    use indexmap::IndexMap;

    fn create_test_rules() -> ValidateParams {
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
                payload: json!({
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }),
                headers: json!({"type": "object", "additionalProperties": true}),
            },
        );

        ValidateParams {
            query: Some(json!({
                "type": "object",
                "properties": {
                    "limit": {"anyOf": [
                        {"type": "integer"},
                        {"type": "string", "pattern": "^-?\\d+$"}
                    ]}
                },
                "additionalProperties": false
            })),
            payload: Some(json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"]
            })),
            responses,
            ..ValidateParams::default()
        }
    }

    fn create_test_validation() -> RouteValidation {
        RouteValidation::new(Arc::new(ValidatorCache::new()), create_test_rules())
    }

    #[test]
    fn test_request_query_coercion() {
        let validation = create_test_validation();
        let request = RequestParts {
            query: json!({"limit": "3"}),
            payload: Some(json!({"name": "Rex"})),
            ..RequestParts::default()
        };

        let validated = validation.validate_request(&request).unwrap();
        assert_eq!(validated.query, json!({"limit": 3}));
        // Body is forwarded verbatim.
        assert_eq!(validated.payload, Some(json!({"name": "Rex"})));
    }

    #[test]
    fn test_request_query_failure_is_client_error() {
        let validation = create_test_validation();
        let request = RequestParts {
            query: json!({"limit": "abc"}),
            payload: Some(json!({"name": "Rex"})),
            ..RequestParts::default()
        };

        let rejection = validation.validate_request(&request).unwrap_err();
        assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
        assert_eq!(*rejection.error.location(), SchemaLocation::Query);
        assert!(rejection
            .error
            .violations()
            .iter()
            .any(|v| v.path.contains("limit")));
    }

    #[test]
    fn test_missing_payload_fails_when_schema_requires_it() {
        let validation = create_test_validation();
        let request = RequestParts {
            query: json!({}),
            payload: None,
            ..RequestParts::default()
        };

        let rejection = validation.validate_request(&request).unwrap_err();
        assert_eq!(*rejection.error.location(), SchemaLocation::Payload);
    }

    #[test]
    fn test_empty_payload_object_lists_missing_required_field() {
        let validation = create_test_validation();
        let request = RequestParts {
            payload: Some(json!({})),
            ..RequestParts::default()
        };

        let rejection = validation.validate_request(&request).unwrap_err();
        assert_eq!(*rejection.error.location(), SchemaLocation::Payload);
        assert!(rejection
            .error
            .violations()
            .iter()
            .any(|v| v.constraint == "required" && v.path.contains("name")));
    }

    #[test]
    fn test_unvalidated_locations_accept_anything() {
        // No params/headers schemas in the rules: those locations are
        // never validated.
        let validation = create_test_validation();
        let request = RequestParts {
            params: json!({"anything": "goes"}),
            headers: json!({"x-whatever": "1"}),
            payload: Some(json!({"name": "Rex"})),
            ..RequestParts::default()
        };

        assert!(validation.validate_request(&request).is_ok());
    }

    #[test]
    fn test_response_mismatch_is_server_error() {
        let validation = create_test_validation();

        let rejection = validation
            .validate_response(200, &json!({}), &json!({}))
            .unwrap_err();
        assert_eq!(rejection.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            *rejection.error.location(),
            SchemaLocation::Response("200".to_string())
        );
    }

    #[test]
    fn test_undeclared_status_falls_back_to_default() {
        let validation = create_test_validation();
        // 503 is undeclared; the permissive default applies.
        assert!(validation
            .validate_response(503, &json!("anything"), &json!({}))
            .is_ok());
    }

    #[test]
    fn test_response_is_not_coerced() {
        let validation = create_test_validation();
        // A numeric string is not silently coerced for the handler.
        let rejection = validation
            .validate_response(200, &json!({"name": 42}), &json!({}))
            .unwrap_err();
        assert_eq!(rejection.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rejection_payload_echoes_detail() {
        let validation = create_test_validation();
        let request = RequestParts {
            query: json!({"stray": 1}),
            payload: Some(json!({"name": "Rex"})),
            ..RequestParts::default()
        };

        let rejection = validation.validate_request(&request).unwrap_err();
        let payload = rejection.to_payload();
        assert_eq!(payload["status"], 400);
        assert_eq!(payload["location"], "query");
        assert!(payload["errors"].as_array().is_some_and(|e| !e.is_empty()));
    }
}
