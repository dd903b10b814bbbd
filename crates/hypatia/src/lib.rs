//! # Hypatia
//!
//! **Contract-Driven Routing and Validation Core for the Themis Platform**
//!
//! Hypatia turns a resolved API contract into framework-ready routes:
//!
//! - **Schema Derivation** – Flatten every `(path, method)` pair into a
//!   route with per-location validation schemas
//! - **Memoized Validation** – One compiled validator per structural
//!   schema, shared process-wide
//! - **Handler Binding** – Two-tier handler lookup with a not-implemented
//!   stub for unbound operations
//! - **Contract Enforcement** – Requests rejected with 400, non-conforming
//!   handler responses with 500
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use hypatia::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document: ContractDocument = serde_json::from_value(json!({
//!     "basePath": "/v1",
//!     "paths": {
//!         "/pets": {
//!             "get": {
//!                 "operationId": "listPets",
//!                 "responses": {"200": {"description": "pets"}}
//!             }
//!         }
//!     }
//! }))?;
//!
//! let routes = derive_routes(&document)?;
//! let mut handlers = HashMap::new();
//! handlers.insert("listPets".to_string(), "my-handler");
//!
//! let cache = Arc::new(ValidatorCache::new());
//! let materialized = materialize(routes, &handlers, None, cache)?;
//! assert_eq!(materialized[0].path, "/v1/pets");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Contract → derive_routes → Vec<Route> → materialize → Vec<FrameworkRoute>
//!                                              │
//!                                       ValidatorCache (shared)
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use hypatia_core as core;

// Re-export the schema deriver
pub use hypatia_schema as schema;

// Re-export the validation engine and cache
pub use hypatia_validate as validate;

// Re-export the route materializer
pub use hypatia_router as router;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hypatia::prelude::*;
/// ```
pub mod prelude {
    pub use hypatia_core::{
        ContractDocument, Operation, Parameter, ParameterLocation, ResponseRules, ResponseSpec,
        Route, SchemaLocation, ValidateParams, Violation,
    };

    // Re-export the deriver entry point
    pub use hypatia_schema::{derive_routes, DeriveError, DeriveResult};

    // Re-export validation types
    pub use hypatia_validate::{
        ValidateError, ValidateOptions, ValidateResult, Validator, ValidatorCache,
    };

    // Re-export materialization types
    pub use hypatia_router::{
        materialize, AttachedHandler, FrameworkRoute, HandlerTransform, MaterializeError,
        MaterializeResult, PayloadPolicy, Rejection, RequestParts, Resolved, RouteValidation,
    };
}
