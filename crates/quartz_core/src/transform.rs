//! Placement wrappers: translation and affine coordinate shifts.
//!
//! Both wrappers evaluate the child surface in a transformed frame. Because
//! the ray is transformed along with the point, the ray parameters of the
//! hits are unchanged and can be returned as-is.

use quartz_math::{vector, Ray};

use crate::error::{check_dimension, GeometryError, GeometryResult};
use crate::surface::{Surface, SurfaceRef};

/// A surface moved by `offset`: `F(x) = F_inner(x - offset)`.
#[derive(Debug, Clone)]
pub struct Translate {
    offset: Vec<f64>,
    inner: SurfaceRef,
}

impl Translate {
    pub fn new(offset: Vec<f64>, inner: SurfaceRef) -> GeometryResult<Self> {
        check_dimension(inner.dimension(), offset.len())?;
        Ok(Self { offset, inner })
    }

    pub fn offset(&self) -> &[f64] {
        &self.offset
    }
}

impl Surface for Translate {
    fn dimension(&self) -> usize {
        self.offset.len()
    }

    fn value(&self, x: &[f64]) -> f64 {
        self.inner.value(&vector::sub(x, &self.offset))
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        self.inner.gradient(&vector::sub(x, &self.offset))
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        let local = Ray::new(
            vector::sub(ray.origin(), &self.offset),
            ray.direction.clone(),
        );
        self.inner.intersections(&local)
    }
}

/// A surface evaluated in the frame `y = M (x - origin)`.
///
/// `M` is a row-major square matrix. Rotations, scalings and shears of the
/// child all go through this wrapper.
#[derive(Debug, Clone)]
pub struct CoordinateShift {
    matrix: Vec<Vec<f64>>,
    origin: Vec<f64>,
    inner: SurfaceRef,
}

impl CoordinateShift {
    pub fn new(matrix: Vec<Vec<f64>>, origin: Vec<f64>, inner: SurfaceRef) -> GeometryResult<Self> {
        let n = inner.dimension();
        check_dimension(n, origin.len())?;
        check_dimension(n, matrix.len())?;
        for row in &matrix {
            check_dimension(n, row.len())?;
        }
        if !matrix.iter().all(|row| vector::is_finite(row)) || !vector::is_finite(&origin) {
            return Err(GeometryError::InvalidParameter(
                "coordinate shift must be finite".to_string(),
            ));
        }
        Ok(Self {
            matrix,
            origin,
            inner,
        })
    }

    /// Axis-aligned scaling about `origin`: `y_i = (x_i - origin_i) / factors_i`.
    pub fn scaling(factors: &[f64], origin: Vec<f64>, inner: SurfaceRef) -> GeometryResult<Self> {
        if factors.iter().any(|&f| f == 0.0) {
            return Err(GeometryError::InvalidParameter(
                "scale factors must be non-zero".to_string(),
            ));
        }
        let n = factors.len();
        let matrix = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 / factors[i] } else { 0.0 }).collect())
            .collect();
        Self::new(matrix, origin, inner)
    }

    /// Rotation by `angle` radians in the plane of axes `i` and `j`, about
    /// `origin`.
    pub fn rotation(
        i: usize,
        j: usize,
        angle: f64,
        origin: Vec<f64>,
        inner: SurfaceRef,
    ) -> GeometryResult<Self> {
        let n = inner.dimension();
        if i >= n || j >= n || i == j {
            return Err(GeometryError::InvalidParameter(format!(
                "rotation plane ({i}, {j}) is invalid in dimension {n}"
            )));
        }
        // The child sees the inverse rotation of the world point.
        let (s, c) = (-angle).sin_cos();
        let mut matrix: Vec<Vec<f64>> = (0..n)
            .map(|r| (0..n).map(|k| if r == k { 1.0 } else { 0.0 }).collect())
            .collect();
        matrix[i][i] = c;
        matrix[i][j] = -s;
        matrix[j][i] = s;
        matrix[j][j] = c;
        Self::new(matrix, origin, inner)
    }

    fn to_local(&self, x: &[f64]) -> Vec<f64> {
        vector::mat_mul(&self.matrix, &vector::sub(x, &self.origin))
    }
}

impl Surface for CoordinateShift {
    fn dimension(&self) -> usize {
        self.origin.len()
    }

    fn value(&self, x: &[f64]) -> f64 {
        self.inner.value(&self.to_local(x))
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let local = self.inner.gradient(&self.to_local(x));
        vector::mat_mul_transposed(&self.matrix, &local)
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        let local = Ray::new(
            self.to_local(ray.origin()),
            vector::mat_mul(&self.matrix, ray.direction()),
        );
        self.inner.intersections(&local)
    }
}
