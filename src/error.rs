//! Error types for rotation conversions.

use thiserror::Error;

/// Errors raised by the rotation converter.
///
/// Floating-point drift of an `asin` argument past ±1 is not an error; it is
/// clamped where it occurs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RotationError {
    /// Quaternion is not unit-norm (or has a non-finite component).
    #[error("invalid quaternion: norm {norm} is not within tolerance of 1")]
    InvalidQuaternion {
        /// Euclidean norm of the rejected quaternion.
        norm: f64,
    },

    /// Matrix is not a proper rotation.
    #[error("invalid rotation matrix: {0}")]
    InvalidMatrix(String),

    /// Trace-based quaternion extraction is ill-conditioned (rotation angle near π).
    #[error("degenerate rotation matrix: trace {trace} puts trace + 1 too close to zero")]
    Degenerate {
        /// Trace of the rejected matrix.
        trace: f64,
    },
}

impl RotationError {
    /// Creates an invalid quaternion error.
    #[must_use]
    pub const fn invalid_quaternion(norm: f64) -> Self {
        Self::InvalidQuaternion { norm }
    }

    /// Creates an invalid matrix error.
    #[must_use]
    pub fn invalid_matrix(reason: impl Into<String>) -> Self {
        Self::InvalidMatrix(reason.into())
    }

    /// Creates a degenerate matrix error.
    #[must_use]
    pub const fn degenerate(trace: f64) -> Self {
        Self::Degenerate { trace }
    }
}

/// Result type for rotation conversions.
pub type Result<T> = std::result::Result<T, RotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_quaternion() {
        let err = RotationError::invalid_quaternion(1.5);
        assert!(err.to_string().contains("invalid quaternion"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn error_invalid_matrix() {
        let err = RotationError::invalid_matrix("determinant is -1");
        assert!(err.to_string().contains("invalid rotation matrix"));
        assert!(err.to_string().contains("determinant"));
    }

    #[test]
    fn error_degenerate_reports_trace() {
        let err = RotationError::degenerate(-1.0);
        assert!(err.to_string().contains("degenerate"));
        assert!(err.to_string().contains("trace -1"));
    }
}
