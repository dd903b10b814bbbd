//! Route derivation from a resolved contract document.
//!
//! Derivation walks every `(path, method)` pair of the document and
//! flattens it into a [`Route`]: uri, method, media types, a unique
//! identifier, per-location validation schemas, and a status-keyed map of
//! response rules. The input document is assumed structurally valid (an
//! upstream parser's responsibility); missing optional fields are treated
//! as empty, never as failures.

use std::collections::HashSet;

use http::Method;
use hypatia_core::{
    ContractDocument, Operation, Parameter, ParameterLocation, ResponseRules, Route,
    ValidateParams,
};
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{DeriveError, DeriveResult};
use crate::params::location_schema;

/// Derives one route per supported `(path, method)` pair.
///
/// # Example
///
/// ```
/// use hypatia_schema::derive_routes;
/// use serde_json::json;
///
/// let doc = serde_json::from_value(json!({
///     "basePath": "/v1",
///     "paths": {
///         "/pets": {
///             "get": {"operationId": "listPets", "responses": {}}
///         }
///     }
/// })).unwrap();
///
/// let routes = derive_routes(&doc).unwrap();
/// assert_eq!(routes.len(), 1);
/// assert_eq!(routes[0].uri, "/v1/pets");
/// assert_eq!(routes[0].id, "listPets");
/// ```
pub fn derive_routes(document: &ContractDocument) -> DeriveResult<Vec<Route>> {
    let mut ids = IdGenerator::new();
    // Explicit identifiers are reserved up front so a generated token can
    // never collide with one declared later in the document.
    for operations in document.paths.values() {
        for operation in operations.values() {
            if let Some(id) = &operation.id {
                ids.reserve(id);
            }
        }
    }

    let mut routes = Vec::new();
    for (template, operations) in &document.paths {
        for (method_key, operation) in operations {
            let Some(method) = supported_method(method_key) else {
                debug!(method = %method_key, path = %template, "skipping unsupported method key");
                continue;
            };

            let validate = derive_validate_params(operation, &method, template)?;
            let id = operation
                .id
                .clone()
                .unwrap_or_else(|| ids.generate(method_key, template));

            routes.push(Route {
                uri: join_paths(&document.base_path, template),
                method,
                consumes: operation
                    .consumes
                    .clone()
                    .unwrap_or_else(|| document.consumes.clone()),
                produces: operation
                    .produces
                    .clone()
                    .unwrap_or_else(|| document.produces.clone()),
                id,
                validate,
            });
        }
    }

    debug!(
        paths = document.paths.len(),
        routes = routes.len(),
        "derived routes from contract document"
    );
    Ok(routes)
}

/// Maps a lowercase OpenAPI method key to its HTTP method; unsupported
/// keys derive no route.
fn supported_method(key: &str) -> Option<Method> {
    match key.to_ascii_lowercase().as_str() {
        "get" => Some(Method::GET),
        "post" => Some(Method::POST),
        "put" => Some(Method::PUT),
        "delete" => Some(Method::DELETE),
        "options" => Some(Method::OPTIONS),
        "head" => Some(Method::HEAD),
        "patch" => Some(Method::PATCH),
        _ => None,
    }
}

fn derive_validate_params(
    operation: &Operation,
    method: &Method,
    template: &str,
) -> DeriveResult<ValidateParams> {
    let path_params: Vec<&Parameter> = operation.parameters_in(ParameterLocation::Path).collect();
    let query_params: Vec<&Parameter> = operation.parameters_in(ParameterLocation::Query).collect();
    let header_params: Vec<&Parameter> =
        operation.parameters_in(ParameterLocation::Header).collect();
    let body_params: Vec<&Parameter> = operation.parameters_in(ParameterLocation::Body).collect();
    let form_params: Vec<&Parameter> =
        operation.parameters_in(ParameterLocation::FormData).collect();

    if body_params.len() > 1 {
        return Err(DeriveError::MultipleBodyParameters {
            method: method.to_string(),
            path: template.to_string(),
        });
    }

    // Unknown path/query fields are rejected; headers stay permissive
    // since intermediaries add their own.
    let params = location_schema(&path_params, false);
    let query = location_schema(&query_params, false);
    let headers = location_schema(&header_params, true);

    let payload = if let Some(body) = body_params.first() {
        // The body's nested schema is used verbatim; a body parameter
        // without one still validates, permissively.
        Some(body.schema.clone().unwrap_or_else(|| json!({})))
    } else {
        location_schema(&form_params, false)
    };

    Ok(ValidateParams {
        params,
        query,
        headers,
        payload,
        responses: derive_responses(operation),
    })
}

/// Builds the status-keyed response rules.
///
/// A synthetic permissive `default` entry is injected first so undeclared
/// status codes validate instead of going unchecked; a declared `default`
/// response replaces it.
fn derive_responses(operation: &Operation) -> IndexMap<String, ResponseRules> {
    let mut responses = IndexMap::new();
    responses.insert(
        Route::DEFAULT_RESPONSE_KEY.to_string(),
        ResponseRules {
            payload: json!({}),
            headers: json!({}),
        },
    );

    for (key, spec) in &operation.responses {
        responses.insert(
            key.clone(),
            ResponseRules {
                payload: spec.schema.clone().unwrap_or_else(any_primitive_schema),
                headers: spec.headers.clone().unwrap_or_else(open_object_schema),
            },
        );
    }

    responses
}

/// Unconstrained-but-typed payload schema for declared responses without one.
fn any_primitive_schema() -> Value {
    json!({
        "type": ["array", "boolean", "integer", "number", "object", "string", "null"]
    })
}

/// Permissive open object schema for declared responses without a header
/// schema.
fn open_object_schema() -> Value {
    json!({"type": "object", "additionalProperties": true})
}

fn join_paths(base: &str, template: &str) -> String {
    let base = base.trim_end_matches('/');
    if template.starts_with('/') {
        format!("{}{}", base, template)
    } else {
        format!("{}/{}", base, template)
    }
}

/// Generates operation identifiers unique within one derivation run.
struct IdGenerator {
    used: HashSet<String>,
}

impl IdGenerator {
    fn new() -> Self {
        Self {
            used: HashSet::new(),
        }
    }

    fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_string());
    }

    fn generate(&mut self, method: &str, template: &str) -> String {
        let base = format!("{}_{}", method.to_ascii_lowercase(), slug(template));
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.used.contains(&candidate) {
            counter += 1;
            candidate = format!("{}_{}", base, counter);
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Collapses a path template into an identifier-safe token
/// (`/pets/{petId}` becomes `pets_petId`).
fn slug(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last_underscore = true;
    for c in template.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
