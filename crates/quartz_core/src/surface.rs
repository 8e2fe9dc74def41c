//! The `Surface` trait shared by every implicit object.

use std::fmt;
use std::sync::Arc;

use quartz_math::{vector, Interval, Ray};

/// An implicit surface: the zero set of a scalar field `F`.
///
/// Points where `F >= 0` are *interior*. The gradient therefore points into
/// the solid, and the outward normal is its negation.
pub trait Surface: Send + Sync + fmt::Debug {
    /// Dimension of the space the surface lives in.
    fn dimension(&self) -> usize;

    /// Evaluate the defining function `F` at `x`.
    fn value(&self, x: &[f64]) -> f64;

    /// Analytic gradient of `F` at `x`.
    fn gradient(&self, x: &[f64]) -> Vec<f64>;

    /// All real ray parameters `u` where `origin + u * direction` lies on the
    /// surface. Unordered, possibly negative, possibly empty.
    fn intersections(&self, ray: &Ray) -> Vec<f64>;

    /// True if `x` is inside or on the surface.
    fn contains(&self, x: &[f64]) -> bool {
        self.value(x) >= 0.0
    }

    /// Unit outward normal at `x`.
    ///
    /// Returns the zero vector where the gradient vanishes.
    fn normal(&self, x: &[f64]) -> Vec<f64> {
        vector::scale(&vector::normalize(&self.gradient(x)), -1.0)
    }

    /// Smallest intersection parameter strictly inside `range`.
    fn nearest_hit(&self, ray: &Ray, range: Interval) -> Option<f64> {
        self.intersections(ray)
            .into_iter()
            .filter(|&u| range.surrounds(u))
            .min_by(f64::total_cmp)
    }
}

/// Shared handle to a surface, used for CSG children and scene entries.
pub type SurfaceRef = Arc<dyn Surface>;

impl<S: Surface + ?Sized> Surface for Arc<S> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn value(&self, x: &[f64]) -> f64 {
        (**self).value(x)
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        (**self).gradient(x)
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        (**self).intersections(ray)
    }
}

/// Keep the parameters whose hit point satisfies `keep`.
pub(crate) fn filter_hits(ray: &Ray, roots: Vec<f64>, keep: impl Fn(&[f64]) -> bool) -> Vec<f64> {
    roots.into_iter().filter(|&u| keep(&ray.at(u))).collect()
}
