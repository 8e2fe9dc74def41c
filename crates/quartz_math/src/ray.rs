use crate::vector;

/// A ray in N-dimensional space with origin and direction.
///
/// Rays are used for intersection queries - they represent a line starting at
/// `origin` and traveling in `direction`. The direction is not required to be
/// unit length; intersection parameters are expressed in multiples of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec<f64>,
    pub direction: Vec<f64>,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec<f64>, direction: Vec<f64>) -> Self {
        Self { origin, direction }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> &[f64] {
        &self.direction
    }

    /// Dimension of the space the ray lives in.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.origin.len()
    }

    /// Get the point along the ray at parameter u.
    ///
    /// Returns: origin + u * direction
    pub fn at(&self, u: f64) -> Vec<f64> {
        vector::add_scaled(&self.origin, &self.direction, u)
    }
}
