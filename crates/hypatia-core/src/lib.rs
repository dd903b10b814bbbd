//! # Hypatia Core
//!
//! Core types for the Hypatia contract-routing core.
//!
//! This crate provides the foundational types used throughout Hypatia:
//!
//! - [`ContractDocument`] - The resolved contract document consumed by derivation
//! - [`Route`] / [`ValidateParams`] - Derived, framework-agnostic route descriptors
//! - [`SchemaLocation`] / [`Violation`] - Shared validation report vocabulary

#![doc(html_root_url = "https://docs.rs/hypatia-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod contract;
mod report;
mod route;

pub use contract::{ContractDocument, Operation, Parameter, ParameterLocation, ResponseSpec};
pub use report::{SchemaLocation, Violation};
pub use route::{ResponseRules, Route, ValidateParams};
