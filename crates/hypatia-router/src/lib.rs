//! # Hypatia Router
//!
//! Route materializer for the Hypatia contract-routing core.
//!
//! Takes the deriver's transport-neutral routes and binds them to
//! application handlers: two-tier handler lookup with a not-implemented
//! stub fallback, an optional handler transform, per-route payload
//! policies, and request/response validation wired to the shared
//! validator cache.

#![doc(html_root_url = "https://docs.rs/hypatia-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod materialize;
mod validation;

pub use error::{MaterializeError, MaterializeResult};
pub use materialize::{
    materialize, not_implemented_payload, AttachedHandler, FrameworkRoute, HandlerTransform,
    PayloadOutput, PayloadPolicy, Resolved, MAX_PAYLOAD_BYTES,
};
pub use validation::{Rejection, RequestParts, RouteValidation};
