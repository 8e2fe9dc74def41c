//! Polynomial surfaces of degree one to four.
//!
//! A polynomial surface is `F(x) = c + T1·x + T2·xx + T3·xxx + T4·xxxx`, where
//! each `Tk` is a symmetric tensor of rank `k`. Ray queries substitute
//! `x = o + u d`, collect the result into a univariate polynomial in `u` and
//! hand it to the closed-form root finder.

use quartz_math::{roots, Ray, SymmetricTensor};

use crate::error::{check_dimension, GeometryError, GeometryResult};
use crate::surface::Surface;

/// Highest supported polynomial degree.
pub const MAX_DEGREE: usize = 4;

/// An implicit surface defined by a polynomial of degree at most four.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialSurface {
    dimension: usize,
    constant: f64,
    /// `terms[k]` holds the rank `k + 1` coefficients.
    terms: Vec<SymmetricTensor>,
}

impl PolynomialSurface {
    /// Create a polynomial surface from a constant and tensors of rank
    /// 1, 2, ... in order.
    ///
    /// Fails if the dimension is zero, if more than four terms are given, or
    /// if any tensor has the wrong rank or dimension.
    pub fn new(
        dimension: usize,
        constant: f64,
        terms: Vec<SymmetricTensor>,
    ) -> GeometryResult<Self> {
        if dimension == 0 {
            return Err(GeometryError::ZeroDimension);
        }
        if terms.len() > MAX_DEGREE {
            return Err(GeometryError::InvalidParameter(format!(
                "degree {} exceeds the supported maximum of {MAX_DEGREE}",
                terms.len()
            )));
        }
        for (k, term) in terms.iter().enumerate() {
            check_dimension(dimension, term.dimension())?;
            if term.rank() != k + 1 {
                return Err(GeometryError::InvalidParameter(format!(
                    "term {} has rank {}, expected {}",
                    k,
                    term.rank(),
                    k + 1
                )));
            }
        }
        Ok(Self {
            dimension,
            constant,
            terms,
        })
    }

    /// `c + l·x`
    pub fn linear(constant: f64, linear: &[f64]) -> GeometryResult<Self> {
        Self::new(linear.len(), constant, vec![SymmetricTensor::vector(linear)])
    }

    /// `c + l·x + Q·xx`
    pub fn quadratic(
        constant: f64,
        linear: SymmetricTensor,
        quadratic: SymmetricTensor,
    ) -> GeometryResult<Self> {
        Self::new(linear.dimension(), constant, vec![linear, quadratic])
    }

    /// `c + l·x + Q·xx + C·xxx`
    pub fn cubic(
        constant: f64,
        linear: SymmetricTensor,
        quadratic: SymmetricTensor,
        cubic: SymmetricTensor,
    ) -> GeometryResult<Self> {
        Self::new(linear.dimension(), constant, vec![linear, quadratic, cubic])
    }

    /// `c + l·x + Q·xx + C·xxx + K·xxxx`
    pub fn quartic(
        constant: f64,
        linear: SymmetricTensor,
        quadratic: SymmetricTensor,
        cubic: SymmetricTensor,
        quartic: SymmetricTensor,
    ) -> GeometryResult<Self> {
        Self::new(
            linear.dimension(),
            constant,
            vec![linear, quadratic, cubic, quartic],
        )
    }

    /// The constant term.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Coefficient tensors, lowest rank first.
    pub fn terms(&self) -> &[SymmetricTensor] {
        &self.terms
    }

    /// Degree of the highest non-zero term (zero for a constant).
    pub fn degree(&self) -> usize {
        self.terms
            .iter()
            .rposition(|t| !t.is_zero())
            .map_or(0, |k| k + 1)
    }

    /// Coefficients of `F(o + u d)` as a polynomial in `u`, lowest power first.
    pub fn along(&self, ray: &Ray) -> [f64; MAX_DEGREE + 1] {
        let mut coefficients = [0.0; MAX_DEGREE + 1];
        coefficients[0] = self.constant;
        for term in &self.terms {
            term.accumulate_along(ray.origin(), ray.direction(), &mut coefficients);
        }
        coefficients
    }
}

impl Surface for PolynomialSurface {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn value(&self, x: &[f64]) -> f64 {
        self.constant + self.terms.iter().map(|t| t.contract(x)).sum::<f64>()
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let mut gradient = vec![0.0; self.dimension];
        for term in &self.terms {
            term.accumulate_gradient(x, &mut gradient);
        }
        gradient
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        // `solve` drops exactly-zero leading coefficients, so a ray along
        // which the quartic part vanishes is handled by the cubic solver, etc.
        roots::solve(&self.along(ray))
    }
}
