//! Error types for the Galaxy3D scene core
//!
//! Contract violations (bad arguments, malformed projections) and numeric
//! degeneracies (zero-length vectors, singular transforms) are reported
//! through a single [`Error`] enum.

use std::fmt;

/// Result type for Galaxy3D scene operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D scene errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Caller broke an operation's contract (negative time delta, bad index, ...)
    InvalidArgument(String),

    /// Projection or placement parameters do not describe a valid frustum
    InvalidFrustum(String),

    /// Numeric degeneracy (zero-length normalization, singular inverse, ...)
    Arithmetic(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::InvalidFrustum(msg) => write!(f, "Invalid frustum: {}", msg),
            Error::Arithmetic(msg) => write!(f, "Arithmetic error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Build an [`Error::InvalidArgument`] and log it at ERROR severity.
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_scene::engine_err;
/// let err = engine_err!("galaxy3d::Scene", "time delta must be >= 0, got {}", -1.0);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::InvalidArgument(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
