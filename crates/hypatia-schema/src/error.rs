//! Derivation error types.

use thiserror::Error;

/// Result type for derivation operations.
pub type DeriveResult<T> = Result<T, DeriveError>;

/// Errors that can occur while deriving routes from a contract document.
///
/// These indicate a static misconfiguration of the contract; they abort
/// setup and are never retried.
#[derive(Debug, Clone, Error)]
pub enum DeriveError {
    /// An operation declared more than one `body` parameter, so its payload
    /// location has no derivable schema.
    #[error("operation {method} {path} declares multiple body parameters")]
    MultipleBodyParameters {
        /// HTTP method of the offending operation.
        method: String,
        /// Path template of the offending operation.
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_body_parameters_display() {
        let err = DeriveError::MultipleBodyParameters {
            method: "POST".to_string(),
            path: "/pets".to_string(),
        };
        assert!(err.to_string().contains("POST"));
        assert!(err.to_string().contains("/pets"));
        assert!(err.to_string().contains("multiple body parameters"));
    }
}
