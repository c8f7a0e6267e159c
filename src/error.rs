//! Error types for octant triangulation

use thiserror::Error;

/// Errors that can occur while configuring or generating a triangulation
///
/// Non-convergence of the iterative solvers is not an error: it is logged
/// and reported alongside the best available estimate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OctantError {
    /// An argument was outside the range the operation is defined for
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A generator name that is not in the registry
    #[error("unknown triangulation method: {0}")]
    UnknownMethod(String),
}

/// Result type alias for octant operations
pub type Result<T> = std::result::Result<T, OctantError>;
