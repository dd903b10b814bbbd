//! # Hypatia Validate
//!
//! Validator cache and engine for the Hypatia contract-routing core.
//!
//! This crate compiles JSON Schemas into executable validators exactly once
//! per distinct schema value, caches them for the process lifetime, and
//! executes them with per-call-site coercion and defaulting policies:
//!
//! - [`Validator`] - A compiled, reusable matcher for one schema
//! - [`ValidatorCache`] - Process-wide, append-only memoization keyed by schema value
//! - [`ValidateOptions`] - Opt-in coercion/defaulting (requests coerce, responses do not)
//! - [`ValidateError`] - Structured, location-tagged validation failures

#![doc(html_root_url = "https://docs.rs/hypatia-validate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod engine;
mod error;

pub use cache::ValidatorCache;
pub use engine::{ValidateOptions, Validator};
pub use error::{ValidateError, ValidateResult};
