//! Per-sample light path state.

use quartz_math::Ray;

use crate::Color;

/// The state a path carries from bounce to bounce.
///
/// `throughput` multiplies whatever light the path eventually collects,
/// `emission` is the light already collected, and `redirected` is the share
/// of the path still being followed. `redirected` starts at one and only
/// color operations shrink it; composite intensities scale `throughput`.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRay {
    /// Number of surface interactions so far.
    pub depth: usize,
    pub position: Vec<f64>,
    /// Not required to be unit length.
    pub direction: Vec<f64>,
    pub throughput: Color,
    pub emission: Color,
    pub redirected: f64,
    /// Scene index of the surface hit last, excluded from the next search.
    pub last_hit: Option<usize>,
}

impl LightRay {
    /// Start a path at a camera ray.
    pub fn new(ray: Ray) -> Self {
        Self {
            depth: 0,
            position: ray.origin,
            direction: ray.direction,
            throughput: Color::ONE,
            emission: Color::ZERO,
            redirected: 1.0,
            last_hit: None,
        }
    }

    pub fn dimension(&self) -> usize {
        self.position.len()
    }

    /// The ray from the current position along the current direction.
    pub fn ray(&self) -> Ray {
        Ray::new(self.position.clone(), self.direction.clone())
    }

    /// Collect `color` through the current throughput and end the path.
    pub fn glow(&mut self, color: Color) {
        self.emission += self.throughput * color * self.redirected;
        self.redirected = 0.0;
    }

    /// Filter the throughput by `color`.
    pub fn absorb(&mut self, color: Color) {
        self.throughput *= color;
    }

    /// Final color of the path: collected light plus whatever the path still
    /// carries.
    pub fn derive_color(&self) -> Color {
        self.emission + self.throughput * self.redirected
    }
}
