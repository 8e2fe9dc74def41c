//! Quartz Renderer - CPU path tracing for implicit CSG scenes.
//!
//! A Monte Carlo path tracer with adaptive per-pixel sampling. Paths bounce
//! through a [`Scene`] of implicit surfaces from `quartz_core`, each paired
//! with an [`InteractionSelector`] that picks the material at the hit point.
//! Pixels keep sampling until the variance of their mean settles or a sample
//! ceiling is reached.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quartz_core::{Sphere, SurfaceRef};
//! use quartz_renderer::{
//!     render, CancelToken, Color, Lambertian, PinholeCamera, RenderConfig, Scene,
//! };
//!
//! let mut scene = Scene::new(3).with_uniform_background(Color::splat(0.8));
//! let ball: SurfaceRef = Arc::new(Sphere::new(vec![0.0, 0.0, -3.0], 1.0)?);
//! scene.add(ball, Arc::new(Lambertian::absorbing(Color::new(0.7, 0.3, 0.3))))?;
//!
//! let camera = PinholeCamera::new().with_resolution(64, 48);
//! let image = render(&scene, &camera, &RenderConfig::default(), &CancelToken::new())?;
//! image.save_png("ball.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bucket;
mod camera;
mod cancel;
mod error;
mod light_ray;
mod material;
mod renderer;
mod sampler;
mod scene;
mod selector;
mod stats;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, PinholeCamera};
pub use cancel::CancelToken;
pub use error::{RenderError, RenderResult, TraceError};
pub use light_ray::LightRay;
pub use material::{
    random_unit_vector, Color, ColorOp, Composite, InteractionModel, Lambertian, Mirror,
    Refractive, Specular,
};
pub use renderer::{color_to_rgba, render, ImageBuffer, RenderConfig};
pub use sampler::{pixel_seed, sample_pixel, PixelSample};
pub use scene::{sky_gradient, Background, Scene, SceneObject, TraceOutcome, TraceState};
pub use selector::{Checker, FnSelector, InteractionSelector};
pub use stats::{ChannelStats, SampleStats};

/// Re-export common math types from quartz_math
pub use quartz_math::{DVec3, Interval, Ray};
