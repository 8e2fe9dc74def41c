//! Interaction models describing how light leaves a surface.
//!
//! Every model does two things to a [`LightRay`] at a hit: picks the new
//! direction and applies its [`ColorOp`]. Directions live in the scene's
//! dimension, so the helpers here work on `[f64]` slices.

use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use quartz_math::vector;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, StandardNormal};

use crate::error::{RenderError, RenderResult};
use crate::light_ray::LightRay;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = DVec3;

/// How an interaction changes the light a path carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorOp {
    /// Collect `color` and end the path.
    Glow(Color),
    /// Filter the throughput.
    Absorb(Color),
    /// Collect a share `absorb` of `glow`, filter by `transmit`, and keep
    /// following the remaining `1 - absorb` of the path.
    GlowAbsorbAverage {
        glow: Color,
        transmit: Color,
        absorb: f64,
    },
}

impl ColorOp {
    pub fn apply(&self, ray: &mut LightRay) {
        match *self {
            ColorOp::Glow(color) => ray.glow(color),
            ColorOp::Absorb(color) => ray.absorb(color),
            ColorOp::GlowAbsorbAverage {
                glow,
                transmit,
                absorb,
            } => {
                ray.emission += ray.throughput * glow * ray.redirected * absorb;
                ray.throughput *= transmit;
                ray.redirected *= 1.0 - absorb;
            }
        }
    }
}

/// Trait for models that describe how light interacts with surfaces.
pub trait InteractionModel: Send + Sync + fmt::Debug {
    /// Redirect `ray` at its current position and apply the color operation.
    ///
    /// `normal` is the unit outward normal of the surface, or the zero vector
    /// where the surface has no well-defined normal.
    fn interact(&self, ray: &mut LightRay, normal: &[f64], rng: &mut dyn RngCore);
}

/// Diffuse scattering: unit normal plus a uniform unit vector.
///
/// With a zero normal the new direction is uniform over the whole sphere,
/// which is how volumetric mist scatters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    pub color: ColorOp,
}

impl Lambertian {
    pub fn new(color: ColorOp) -> Self {
        Self { color }
    }

    /// Diffuse surface filtering by `albedo`.
    pub fn absorbing(albedo: Color) -> Self {
        Self::new(ColorOp::Absorb(albedo))
    }

    /// Light source emitting `color`.
    pub fn glowing(color: Color) -> Self {
        Self::new(ColorOp::Glow(color))
    }
}

impl InteractionModel for Lambertian {
    fn interact(&self, ray: &mut LightRay, normal: &[f64], rng: &mut dyn RngCore) {
        let n = facing(normal, &ray.direction);
        let mut direction = vector::add(&n, &random_unit_vector(ray.dimension(), rng));

        // Catch degenerate scatter direction
        if vector::length_squared(&direction) < 1e-12 {
            direction = n;
        }

        ray.direction = direction;
        self.color.apply(ray);
    }
}

/// Perfect mirror.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mirror {
    pub color: ColorOp,
}

impl Mirror {
    pub fn new(color: ColorOp) -> Self {
        Self { color }
    }
}

impl InteractionModel for Mirror {
    fn interact(&self, ray: &mut LightRay, normal: &[f64], _rng: &mut dyn RngCore) {
        ray.direction = vector::reflect(&ray.direction, normal);
        self.color.apply(ray);
    }
}

/// Glossy reflection: a mirror direction blurred by a Gaussian offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Specular {
    /// Standard deviation of the offset added to the unit mirror direction.
    pub scatter: f64,
    pub color: ColorOp,
}

impl Specular {
    pub fn new(scatter: f64, color: ColorOp) -> Self {
        Self { scatter, color }
    }
}

impl InteractionModel for Specular {
    fn interact(&self, ray: &mut LightRay, normal: &[f64], rng: &mut dyn RngCore) {
        let n = facing(normal, &ray.direction);
        let mirrored = vector::normalize(&vector::reflect(&ray.direction, &n));
        let mut direction: Vec<f64> = mirrored
            .iter()
            .map(|&x| {
                let offset: f64 = StandardNormal.sample(&mut *rng);
                x + self.scatter * offset
            })
            .collect();

        // Blurred into the surface: fold it back out
        if vector::dot(&direction, &n) < 0.0 {
            direction = vector::reflect(&direction, &n);
        }

        ray.direction = direction;
        self.color.apply(ray);
    }
}

/// Refraction through a boundary with a single index of refraction.
///
/// The sign of the incidence cosine against the outward normal tells whether
/// the path is entering or leaving. Total internal reflection mirrors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refractive {
    pub index: f64,
    pub color: ColorOp,
}

impl Refractive {
    pub fn new(index: f64, color: ColorOp) -> Self {
        Self { index, color }
    }
}

impl InteractionModel for Refractive {
    fn interact(&self, ray: &mut LightRay, normal: &[f64], _rng: &mut dyn RngCore) {
        let d = vector::normalize(&ray.direction);
        let cosine = -vector::dot(&d, normal);

        let (ratio, cosine, n) = if cosine > 0.0 {
            (1.0 / self.index, cosine, normal.to_vec())
        } else {
            (self.index, -cosine, vector::scale(normal, -1.0))
        };

        let discriminant = 1.0 - ratio * ratio * (1.0 - cosine * cosine);
        ray.direction = if discriminant < 0.0 {
            vector::reflect(&d, &n)
        } else {
            let along_normal = ratio * cosine - discriminant.sqrt();
            vector::add_scaled(&vector::scale(&d, ratio), &n, along_normal)
        };
        self.color.apply(ray);
    }
}

/// One weighted alternative of a [`Composite`].
#[derive(Debug, Clone)]
struct Branch {
    /// Upper end of this branch's slice of [0, 1).
    cumulative: f64,
    intensity: f64,
    model: Arc<dyn InteractionModel>,
}

/// Picks one of several interactions at random for each hit.
///
/// Each branch has a probability and an intensity that scales the throughput
/// when the branch is chosen. Probabilities are normalized to sum to one.
#[derive(Debug, Clone)]
pub struct Composite {
    branches: Vec<Branch>,
}

impl Composite {
    /// Build from `(probability, intensity, model)` triples.
    pub fn new(branches: Vec<(f64, f64, Arc<dyn InteractionModel>)>) -> RenderResult<Self> {
        if branches.is_empty() {
            return Err(RenderError::InvalidMaterial(
                "composite needs at least one branch".to_string(),
            ));
        }
        if branches
            .iter()
            .any(|(p, i, _)| !(p.is_finite() && *p >= 0.0 && i.is_finite()))
        {
            return Err(RenderError::InvalidMaterial(
                "composite probabilities must be finite and non-negative".to_string(),
            ));
        }
        let total: f64 = branches.iter().map(|(p, _, _)| p).sum();
        if total <= 0.0 {
            return Err(RenderError::InvalidMaterial(
                "composite probabilities sum to zero".to_string(),
            ));
        }

        let mut cumulative = 0.0;
        let branches = branches
            .into_iter()
            .map(|(probability, intensity, model)| {
                cumulative += probability / total;
                Branch {
                    cumulative,
                    intensity,
                    model,
                }
            })
            .collect();
        Ok(Self { branches })
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    fn pick(&self, draw: f64) -> &Branch {
        let index = self
            .branches
            .iter()
            .position(|b| draw < b.cumulative)
            .unwrap_or(self.branches.len() - 1);
        &self.branches[index]
    }
}

impl InteractionModel for Composite {
    fn interact(&self, ray: &mut LightRay, normal: &[f64], rng: &mut dyn RngCore) {
        let branch = self.pick(rng.gen::<f64>());
        ray.throughput *= branch.intensity;
        branch.model.interact(ray, normal, rng);
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// `normal` flipped if needed to face against `direction`.
fn facing(normal: &[f64], direction: &[f64]) -> Vec<f64> {
    if vector::dot(normal, direction) > 0.0 {
        vector::scale(normal, -1.0)
    } else {
        normal.to_vec()
    }
}

/// Uniform random unit vector in `dimension` dimensions.
pub fn random_unit_vector(dimension: usize, rng: &mut dyn RngCore) -> Vec<f64> {
    if dimension == 3 {
        let z = rng.gen::<f64>() * 2.0 - 1.0;
        let phi = rng.gen::<f64>() * std::f64::consts::TAU;
        let r = (1.0 - z * z).max(0.0).sqrt();
        return vec![r * phi.cos(), r * phi.sin(), z];
    }

    // Use rejection sampling for uniform distribution on sphere
    loop {
        let v: Vec<f64> = (0..dimension)
            .map(|_| rng.gen::<f64>() * 2.0 - 1.0)
            .collect();
        let len_sq = vector::length_squared(&v);
        if len_sq > 1e-12 && len_sq <= 1.0 {
            return vector::scale(&v, 1.0 / len_sq.sqrt());
        }
    }
}
