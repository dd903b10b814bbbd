//! Validation report vocabulary shared by the engine and the materializer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The request or response location a validation outcome is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaLocation {
    /// Path parameters.
    Params,
    /// Query string fields.
    Query,
    /// Request headers.
    Headers,
    /// Request payload.
    Payload,
    /// A response, tagged with its status key (`"200"`, `"default"`, ...).
    Response(String),
}

impl SchemaLocation {
    /// Returns true for request locations (as opposed to responses).
    ///
    /// Request-location failures are the caller's fault (4xx); response
    /// failures mean the handler violated its own declared contract (5xx).
    #[must_use]
    pub const fn is_request(&self) -> bool {
        !matches!(self, Self::Response(_))
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Params => write!(f, "params"),
            Self::Query => write!(f, "query"),
            Self::Headers => write!(f, "headers"),
            Self::Payload => write!(f, "payload"),
            Self::Response(key) => write!(f, "response {}", key),
        }
    }
}

/// One field-level constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path into the validated data (e.g. `$.pets[1].name`).
    pub path: String,
    /// The constraint keyword that failed (`type`, `required`, `minimum`, ...).
    pub constraint: String,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.constraint)
    }
}
