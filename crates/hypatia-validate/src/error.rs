//! Validation error types.

use hypatia_core::{SchemaLocation, Violation};
use thiserror::Error;

/// Result type for validation operations.
pub type ValidateResult<T> = Result<T, ValidateError>;

/// A validation failure, attributable to its source location.
///
/// [`ValidateError::Invalid`] carries the full list of field-level
/// violations. [`ValidateError::Unknown`] is the defensive fallback for an
/// engine failure without detail; callers must be able to tell the two
/// apart in logs and telemetry.
#[derive(Debug, Clone, Error)]
pub enum ValidateError {
    /// One or more constraint violations were found.
    #[error("validation failed at {location}: {} violation(s)", violations.len())]
    Invalid {
        /// Where in the request/response the failure occurred.
        location: SchemaLocation,
        /// Every violation found, with its field path.
        violations: Vec<Violation>,
    },

    /// The validator reported failure but supplied no detail.
    #[error("validator reported failure without detail at {location}")]
    Unknown {
        /// Where in the request/response the failure occurred.
        location: SchemaLocation,
    },
}

impl ValidateError {
    /// Returns the source location this failure is attributed to.
    #[must_use]
    pub const fn location(&self) -> &SchemaLocation {
        match self {
            Self::Invalid { location, .. } | Self::Unknown { location } => location,
        }
    }

    /// Returns the field-level violations (empty for [`ValidateError::Unknown`]).
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid { violations, .. } => violations,
            Self::Unknown { .. } => &[],
        }
    }
}
