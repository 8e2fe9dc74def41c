//! Errors raised while constructing surfaces.

use quartz_math::TensorError;
use thiserror::Error;

/// Errors that can occur when building a surface.
///
/// No constructor hands out a partially-initialized surface; every failure
/// is reported through one of these variants instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Surfaces must have at least one dimension")]
    ZeroDimension,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Degenerate normal: plane normal has zero length")]
    DegenerateNormal,

    #[error("Tensor error: {0}")]
    Tensor(#[from] TensorError),
}

/// Result type for surface construction.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Check that `found` matches the `expected` dimension.
pub(crate) fn check_dimension(expected: usize, found: usize) -> GeometryResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(GeometryError::DimensionMismatch { expected, found })
    }
}
