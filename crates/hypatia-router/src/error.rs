//! Materialization error types.

use thiserror::Error;

/// Result type for materialization operations.
pub type MaterializeResult<T> = Result<T, MaterializeError>;

/// Errors that can occur while materializing routes.
///
/// These are programming errors in the setup code, not request-time
/// conditions; the process must not start serving with them present.
#[derive(Debug, Clone, Error)]
pub enum MaterializeError {
    /// The supplied handler transform is not usable.
    #[error("unsupported handler transform: {reason}")]
    Transform {
        /// Why the transform was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        let err = MaterializeError::Transform {
            reason: "wrapper name is empty".to_string(),
        };
        assert!(err.to_string().contains("unsupported handler transform"));
        assert!(err.to_string().contains("wrapper name is empty"));
    }
}
