//! # Hypatia Schema
//!
//! Schema deriver for the Hypatia contract-routing core.
//!
//! Walks a resolved contract document and flattens every supported
//! `(path, method)` pair into a [`hypatia_core::Route`]: per-location
//! validation schemas (with string-transport numeric tolerance), payload
//! and response rules, media-type fallbacks, and run-unique identifiers.

#![doc(html_root_url = "https://docs.rs/hypatia-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod derive;
mod error;
mod params;

pub use derive::derive_routes;
pub use error::{DeriveError, DeriveResult};
