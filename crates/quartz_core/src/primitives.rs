//! Primitive shapes: sphere, plane, torus and mist.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use quartz_math::{roots, vector, Ray, SymmetricTensor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};

use crate::error::{GeometryError, GeometryResult};
use crate::polynomial::PolynomialSurface;
use crate::surface::Surface;

/// A sphere, `F(x) = r^2 - |x - c|^2`.
///
/// This is a quadratic surface with a specialized intersection routine;
/// [`Sphere::to_polynomial`] gives the equivalent general form.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Vec<f64>,
    radius_squared: f64,
}

impl Sphere {
    /// Create a sphere from its center and squared radius.
    pub fn new(center: Vec<f64>, radius_squared: f64) -> GeometryResult<Self> {
        if center.is_empty() {
            return Err(GeometryError::ZeroDimension);
        }
        if !(radius_squared > 0.0 && radius_squared.is_finite()) {
            return Err(GeometryError::InvalidParameter(format!(
                "sphere radius squared must be positive, got {radius_squared}"
            )));
        }
        Ok(Self {
            center,
            radius_squared,
        })
    }

    pub fn center(&self) -> &[f64] {
        &self.center
    }

    pub fn radius_squared(&self) -> f64 {
        self.radius_squared
    }

    /// The same sphere as a general quadratic polynomial surface.
    pub fn to_polynomial(&self) -> GeometryResult<PolynomialSurface> {
        let n = self.center.len();
        let constant = self.radius_squared - vector::length_squared(&self.center);
        let linear = SymmetricTensor::vector(&vector::scale(&self.center, 2.0));
        let quadratic = SymmetricTensor::from_fn(n, 2, |idx| if idx[0] == idx[1] { -1.0 } else { 0.0 });
        PolynomialSurface::quadratic(constant, linear, quadratic)
    }
}

impl Surface for Sphere {
    fn dimension(&self) -> usize {
        self.center.len()
    }

    fn value(&self, x: &[f64]) -> f64 {
        self.radius_squared - vector::length_squared(&vector::sub(x, &self.center))
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        vector::scale(&vector::sub(x, &self.center), -2.0)
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        let oc = vector::sub(ray.origin(), &self.center);
        let a = vector::length_squared(ray.direction());
        if a == 0.0 {
            return Vec::new();
        }
        let b = 2.0 * vector::dot(&oc, ray.direction());
        let c = vector::length_squared(&oc) - self.radius_squared;
        roots::quadratic(c / a, b / a)
    }
}

/// A half-space bounded by a hyperplane.
///
/// `normal` points out of the solid: `F(x) = n · (p - x)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    normal: Vec<f64>,
    offset: f64,
}

impl Plane {
    /// Create a plane through `point` with outward `normal`.
    pub fn new(normal: Vec<f64>, point: &[f64]) -> GeometryResult<Self> {
        if normal.is_empty() {
            return Err(GeometryError::ZeroDimension);
        }
        crate::error::check_dimension(normal.len(), point.len())?;
        if vector::is_zero(&normal) {
            return Err(GeometryError::DegenerateNormal);
        }
        let offset = vector::dot(&normal, point);
        Ok(Self { normal, offset })
    }

    /// Outward direction as given, not normalized.
    pub fn outward(&self) -> &[f64] {
        &self.normal
    }
}

impl Surface for Plane {
    fn dimension(&self) -> usize {
        self.normal.len()
    }

    fn value(&self, x: &[f64]) -> f64 {
        self.offset - vector::dot(&self.normal, x)
    }

    fn gradient(&self, _x: &[f64]) -> Vec<f64> {
        vector::scale(&self.normal, -1.0)
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        let along = vector::dot(&self.normal, ray.direction());
        if along == 0.0 {
            return Vec::new();
        }
        roots::linear(-(self.offset - vector::dot(&self.normal, ray.origin())) / along)
    }
}

/// A torus centered at the origin of 3-D space, revolving around the z axis.
///
/// `F(x) = 4 R^2 (x^2 + y^2) - (|x|^2 + R^2 - r^2)^2`, a quartic. Use the
/// transform wrappers to place it elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Torus {
    major_radius: f64,
    minor_radius: f64,
    polynomial: PolynomialSurface,
}

impl Torus {
    pub fn new(major_radius: f64, minor_radius: f64) -> GeometryResult<Self> {
        let valid = |r: f64| r > 0.0 && r.is_finite();
        if !valid(major_radius) || !valid(minor_radius) {
            return Err(GeometryError::InvalidParameter(format!(
                "torus radii must be positive, got {major_radius} and {minor_radius}"
            )));
        }

        let big2 = major_radius * major_radius;
        let k = big2 - minor_radius * minor_radius;

        let quadratic = SymmetricTensor::from_fn(3, 2, |idx| match (idx[0], idx[1]) {
            (2, 2) => -2.0 * k,
            (i, j) if i == j => 4.0 * big2 - 2.0 * k,
            _ => 0.0,
        });
        // -(x^2 + y^2 + z^2)^2
        let quartic = SymmetricTensor::from_fn(3, 4, |idx| {
            let (i, j, l, m) = (idx[0], idx[1], idx[2], idx[3]);
            if i == m {
                -1.0
            } else if i == j && l == m {
                -2.0
            } else {
                0.0
            }
        });
        let polynomial = PolynomialSurface::quartic(
            -k * k,
            SymmetricTensor::zeros(3, 1),
            quadratic,
            SymmetricTensor::zeros(3, 3),
            quartic,
        )?;

        Ok(Self {
            major_radius,
            minor_radius,
            polynomial,
        })
    }

    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    pub fn minor_radius(&self) -> f64 {
        self.minor_radius
    }

    pub fn polynomial(&self) -> &PolynomialSurface {
        &self.polynomial
    }
}

impl Surface for Torus {
    fn dimension(&self) -> usize {
        3
    }

    fn value(&self, x: &[f64]) -> f64 {
        self.polynomial.value(x)
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        self.polynomial.gradient(x)
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        self.polynomial.intersections(ray)
    }
}

/// Translucent volumetric medium.
///
/// The field is zero everywhere, so every point is interior and every hit
/// lies on the surface. The gradient is zero, and each ray reports a single
/// exponentially distributed free-flight distance with the given mean,
/// measured from the ray origin.
/// The distance is drawn from a generator seeded by the ray itself, so the
/// same ray always scatters at the same place. Bound a mist with
/// [`Csg::open_bounding`](crate::Csg::open_bounding) to confine it to a region
/// without making the region's shell visible; the bound then measures the
/// free flight from where the ray enters it.
#[derive(Debug, Clone)]
pub struct Mist {
    dimension: usize,
    free_path: Exp<f64>,
    seed: u64,
}

impl Mist {
    pub fn new(dimension: usize, mean_free_path: f64, seed: u64) -> GeometryResult<Self> {
        if dimension == 0 {
            return Err(GeometryError::ZeroDimension);
        }
        if !(mean_free_path > 0.0 && mean_free_path.is_finite()) {
            return Err(GeometryError::InvalidParameter(format!(
                "mist mean free path must be positive, got {mean_free_path}"
            )));
        }
        let free_path = Exp::new(1.0 / mean_free_path)
            .map_err(|e| GeometryError::InvalidParameter(e.to_string()))?;
        Ok(Self {
            dimension,
            free_path,
            seed,
        })
    }

    fn ray_seed(&self, ray: &Ray) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        for x in ray.origin().iter().chain(ray.direction()) {
            x.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl Surface for Mist {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn value(&self, _x: &[f64]) -> f64 {
        0.0
    }

    fn gradient(&self, _x: &[f64]) -> Vec<f64> {
        vec![0.0; self.dimension]
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        let speed = vector::length(ray.direction());
        if speed == 0.0 {
            return Vec::new();
        }
        let mut rng = StdRng::seed_from_u64(self.ray_seed(ray));
        let distance = self.free_path.sample(&mut rng);
        vec![distance / speed]
    }
}
