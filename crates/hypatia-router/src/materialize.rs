//! Binds derived routes to application handlers.
//!
//! Materialization turns the deriver's transport-neutral [`Route`] records
//! into framework-ready entries: each route gets a resolved handler (or a
//! not-implemented stub), a validation bundle wired to the shared cache,
//! and a payload policy for the methods that carry a body.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;
use hypatia_core::Route;
use hypatia_validate::ValidatorCache;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{MaterializeError, MaterializeResult};
use crate::validation::RouteValidation;

/// Upper bound on buffered request payloads.
pub const MAX_PAYLOAD_BYTES: u64 = 32 * 1024 * 1024;

/// The handler bound to a route after lookup.
#[derive(Debug, Clone)]
pub enum Resolved<H> {
    /// An application handler matched the route.
    Handler(H),
    /// No handler matched; the route answers with a 501 stub.
    NotImplemented,
}

impl<H> Resolved<H> {
    /// Returns `true` when the route fell through to the stub.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }
}

/// An optional decoration applied to every resolved handler.
pub enum HandlerTransform<H> {
    /// Tag each handler with a wrapper name the serving layer dispatches on.
    Name(String),
    /// Rewrite each resolved handler in place.
    Function(Arc<dyn Fn(Resolved<H>) -> Resolved<H> + Send + Sync>),
}

impl<H> Clone for HandlerTransform<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Name(name) => Self::Name(name.clone()),
            Self::Function(f) => Self::Function(Arc::clone(f)),
        }
    }
}

impl<H> fmt::Debug for HandlerTransform<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Function(_) => f.debug_tuple("Function").field(&"<fn>").finish(),
        }
    }
}

/// The handler slot of a materialized route.
#[derive(Debug, Clone)]
pub enum AttachedHandler<H> {
    /// The resolved handler, used as-is.
    Direct(Resolved<H>),
    /// The resolved handler tagged with a named wrapper.
    Wrapped {
        /// The wrapper name supplied by [`HandlerTransform::Name`].
        name: String,
        /// The handler the wrapper delegates to.
        handler: Resolved<H>,
    },
}

impl<H> AttachedHandler<H> {
    /// The resolved handler regardless of wrapping.
    #[must_use]
    pub fn resolved(&self) -> &Resolved<H> {
        match self {
            Self::Direct(handler) | Self::Wrapped { handler, .. } => handler,
        }
    }
}

/// How a route's request payload should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOutput {
    /// Read the full body into memory before the handler runs.
    Buffered,
}

/// Payload handling configuration for one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPolicy {
    /// Acceptable request media types.
    pub allow: Vec<String>,
    /// Whether the body is parsed before validation.
    pub parse: bool,
    /// Maximum accepted body size in bytes.
    pub max_bytes: u64,
    /// Delivery mode for the parsed body.
    pub output: PayloadOutput,
}

impl PayloadPolicy {
    fn for_route(route: &Route) -> Self {
        Self {
            allow: route.consumes.clone(),
            parse: true,
            max_bytes: MAX_PAYLOAD_BYTES,
            output: PayloadOutput::Buffered,
        }
    }
}

/// One framework-ready route: handler, validation, payload policy.
#[derive(Debug)]
pub struct FrameworkRoute<H> {
    /// HTTP method.
    pub method: Method,
    /// Path template with `{name}` segments.
    pub path: String,
    /// Run-unique operation id.
    pub id: String,
    /// The handler slot produced by lookup and transform.
    pub handler: AttachedHandler<H>,
    /// Request/response validation for this route.
    pub validation: RouteValidation,
    /// Payload policy; absent for bodiless methods.
    pub payload: Option<PayloadPolicy>,
}

/// The body the not-implemented stub answers with.
#[must_use]
pub fn not_implemented_payload() -> Value {
    json!({
        "status": 501,
        "message": "operation not implemented",
    })
}

/// Binds derived routes to handlers and produces framework-ready entries.
///
/// Handlers are looked up by operation id first, then by the composite
/// `"<METHOD> <uri>"` key; routes with no match bind the not-implemented
/// stub. The transform, when present, is applied exactly once per route
/// after resolution.
///
/// # Errors
///
/// Returns [`MaterializeError::Transform`] when a named transform carries
/// an empty wrapper name.
pub fn materialize<H: Clone>(
    routes: Vec<Route>,
    handlers: &HashMap<String, H>,
    transform: Option<HandlerTransform<H>>,
    cache: Arc<ValidatorCache>,
) -> MaterializeResult<Vec<FrameworkRoute<H>>> {
    if let Some(HandlerTransform::Name(name)) = &transform {
        if name.is_empty() {
            return Err(MaterializeError::Transform {
                reason: "wrapper name is empty".to_string(),
            });
        }
    }

    let mut materialized = Vec::with_capacity(routes.len());
    for route in routes {
        let resolved = resolve_handler(&route, handlers);
        let handler = attach(resolved, transform.as_ref());

        let payload = if route.method == Method::GET || route.method == Method::HEAD {
            None
        } else {
            Some(PayloadPolicy::for_route(&route))
        };

        debug!(
            id = %route.id,
            method = %route.method,
            uri = %route.uri,
            stub = handler.resolved().is_not_implemented(),
            "materialized route"
        );

        materialized.push(FrameworkRoute {
            method: route.method.clone(),
            path: route.uri.clone(),
            id: route.id.clone(),
            handler,
            validation: RouteValidation::new(Arc::clone(&cache), route.validate),
            payload,
        });
    }

    Ok(materialized)
}

fn resolve_handler<H: Clone>(route: &Route, handlers: &HashMap<String, H>) -> Resolved<H> {
    if let Some(handler) = handlers.get(&route.id) {
        return Resolved::Handler(handler.clone());
    }
    if let Some(handler) = handlers.get(&route.composite_key()) {
        return Resolved::Handler(handler.clone());
    }
    warn!(
        id = %route.id,
        method = %route.method,
        uri = %route.uri,
        "no handler registered, binding not-implemented stub"
    );
    Resolved::NotImplemented
}

fn attach<H>(resolved: Resolved<H>, transform: Option<&HandlerTransform<H>>) -> AttachedHandler<H> {
    match transform {
        None => AttachedHandler::Direct(resolved),
        Some(HandlerTransform::Name(name)) => AttachedHandler::Wrapped {
            name: name.clone(),
            handler: resolved,
        },
        Some(HandlerTransform::Function(f)) => AttachedHandler::Direct(f(resolved)),
    }
}
