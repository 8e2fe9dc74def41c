//! Camera for ray generation.

use glam::DVec3;
use quartz_math::{vector, Ray};
use rand::{Rng, RngCore};

/// Anything that turns a pixel into a primary ray.
pub trait Camera: Send + Sync {
    /// Image size in pixels, `(width, height)`.
    fn resolution(&self) -> (u32, u32);

    /// Dimension of the rays this camera produces.
    fn dimension(&self) -> usize {
        3
    }

    /// Generate a ray for pixel `(col, row)`, row 0 at the top.
    fn get_ray(&self, col: u32, row: u32, rng: &mut dyn RngCore) -> Ray;
}

/// Pinhole camera with separate horizontal and vertical fields of view.
#[derive(Debug, Clone)]
pub struct PinholeCamera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: DVec3,
    look_at: DVec3,
    vup: DVec3,

    // Lens settings
    hfov: f64,         // Horizontal field of view in degrees
    vfov: Option<f64>, // Vertical field of view in degrees, from aspect if unset
    jitter: bool,      // Random offset within each pixel

    // Cached computed values (set by initialize())
    pixel00_loc: DVec3,
    pixel_delta_u: DVec3,
    pixel_delta_v: DVec3,
    u: DVec3,
    v: DVec3,
    w: DVec3,
}

impl PinholeCamera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 320,
            image_height: 240,
            look_from: DVec3::ZERO,
            look_at: DVec3::new(0.0, 0.0, -1.0),
            vup: DVec3::Y,
            hfov: 60.0,
            vfov: None,
            jitter: true,
            pixel00_loc: DVec3::ZERO,
            pixel_delta_u: DVec3::ZERO,
            pixel_delta_v: DVec3::ZERO,
            u: DVec3::X,
            v: DVec3::Y,
            w: DVec3::Z,
        };
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self.rebuilt()
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: DVec3, look_at: DVec3, vup: DVec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.rebuilt()
    }

    /// Set the horizontal field of view in degrees; the vertical one follows
    /// the aspect ratio.
    pub fn with_hfov(mut self, hfov: f64) -> Self {
        self.hfov = hfov;
        self.vfov = None;
        self.rebuilt()
    }

    /// Set both fields of view in degrees.
    pub fn with_fov(mut self, hfov: f64, vfov: f64) -> Self {
        self.hfov = hfov;
        self.vfov = Some(vfov);
        self.rebuilt()
    }

    /// Enable or disable the random offset within each pixel.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self.rebuilt()
    }

    fn rebuilt(mut self) -> Self {
        self.initialize();
        self
    }

    /// Recompute the cached viewport. The `with_*` builders do this; call it
    /// after editing `image_width` or `image_height` directly.
    pub fn initialize(&mut self) {
        // Viewport at unit distance from the eye
        let viewport_width = 2.0 * (self.hfov.to_radians() / 2.0).tan();
        let viewport_height = match self.vfov {
            Some(vfov) => 2.0 * (vfov.to_radians() / 2.0).tan(),
            None => viewport_width * self.image_height as f64 / self.image_width.max(1) as f64,
        };

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / self.image_width.max(1) as f64;
        self.pixel_delta_v = viewport_v / self.image_height.max(1) as f64;

        // Calculate upper left pixel location
        let viewport_upper_left = self.look_from - self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// Camera basis `(u, v, w)`: right, up, and backward.
    pub fn basis(&self) -> (DVec3, DVec3, DVec3) {
        (self.u, self.v, self.w)
    }
}

impl Default for PinholeCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for PinholeCamera {
    fn resolution(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    fn get_ray(&self, col: u32, row: u32, rng: &mut dyn RngCore) -> Ray {
        let (dx, dy) = if self.jitter {
            sample_square(rng)
        } else {
            (0.0, 0.0)
        };

        let pixel_sample = self.pixel00_loc
            + (col as f64 + dx) * self.pixel_delta_u
            + (row as f64 + dy) * self.pixel_delta_v;
        let direction = (pixel_sample - self.look_from).normalize();

        Ray::new(vector::from_dvec3(self.look_from), vector::from_dvec3(direction))
    }
}

/// Sample a random offset in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> (f64, f64) {
    (rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5)
}
