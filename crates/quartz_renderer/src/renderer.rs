//! Image-level rendering.
//!
//! Implements adaptive Monte Carlo path tracing with:
//! - Bucketed, parallel rendering through rayon
//! - Per-pixel seeded random streams for reproducible output
//! - Cooperative cancellation and periodic progress logging

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use quartz_core::GeometryError;
use quartz_math::Interval;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::camera::Camera;
use crate::cancel::CancelToken;
use crate::error::{RenderError, RenderResult};
use crate::scene::Scene;
use crate::Color;

/// Render configuration.
///
/// Every field has a default, so a partial JSON object deserializes into a
/// complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum surface interactions per path
    pub max_depth: usize,
    /// Samples taken before convergence is checked
    pub min_samples: usize,
    /// Hard ceiling on samples per pixel
    pub max_samples: usize,
    /// Largest acceptable variance of the pixel mean, per channel
    pub variance_threshold: f64,
    /// Paths stop once their redirected share is at or below this
    pub redirected_cutoff: f64,
    /// Base seed for the per-pixel random streams
    pub seed: u64,
    /// Log progress every this many finished buckets
    pub progress_interval: usize,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            min_samples: 8,
            max_samples: 256,
            variance_threshold: 1e-5,
            redirected_cutoff: 1e-3,
            seed: 0,
            progress_interval: 16,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_samples(mut self, min_samples: usize, max_samples: usize) -> Self {
        self.min_samples = min_samples;
        self.max_samples = max_samples;
        self
    }

    pub fn with_variance_threshold(mut self, threshold: f64) -> Self {
        self.variance_threshold = threshold;
        self
    }

    pub fn with_redirected_cutoff(mut self, cutoff: f64) -> Self {
        self.redirected_cutoff = cutoff;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_bucket_size(mut self, size: u32) -> Self {
        self.bucket_size = size;
        self
    }

    /// Check the settings before a render starts.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1".to_string());
        }
        if self.max_samples == 0 {
            return invalid("max_samples must be at least 1".to_string());
        }
        if self.min_samples > self.max_samples {
            return invalid(format!(
                "min_samples ({}) exceeds max_samples ({})",
                self.min_samples, self.max_samples
            ));
        }
        if !(self.variance_threshold >= 0.0) {
            return invalid(format!(
                "variance_threshold must be non-negative, got {}",
                self.variance_threshold
            ));
        }
        if !(self.redirected_cutoff >= 0.0) {
            return invalid(format!(
                "redirected_cutoff must be non-negative, got {}",
                self.redirected_cutoff
            ));
        }
        if self.progress_interval == 0 {
            return invalid("progress_interval must be at least 1".to_string());
        }
        if self.bucket_size == 0 {
            return invalid("bucket_size must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Convert a mean color to 8-bit RGBA: `round(clamp(255 c, 0, 255))`.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let channel = |c: f64| Interval::BYTE.clamp(255.0 * c).round() as u8;
    [channel(color.x), channel(color.y), channel(color.z), 255]
}

/// RGBA8 image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        self.pixels[(y * self.width + x) as usize] = rgba;
    }

    /// Copy a finished bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, rgba) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *rgba);
        }
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Write the image as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        image::save_buffer_with_format(
            path,
            self.as_bytes(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        Ok(())
    }
}

/// Render the scene through `camera` into an image buffer.
///
/// Buckets are rendered in parallel in spiral order. Every pixel draws from
/// its own seeded random stream, so the output does not depend on how the
/// buckets are scheduled.
pub fn render(
    scene: &Scene,
    camera: &dyn Camera,
    config: &RenderConfig,
    cancel: &CancelToken,
) -> RenderResult<ImageBuffer> {
    config.validate()?;
    if camera.dimension() != scene.dimension() {
        return Err(GeometryError::DimensionMismatch {
            expected: scene.dimension(),
            found: camera.dimension(),
        }
        .into());
    }

    let (width, height) = camera.resolution();
    let buckets = generate_buckets(width, height, config.bucket_size);
    let total = buckets.len();
    let finished = AtomicUsize::new(0);

    log::info!(
        "Rendering {}x{} ({} buckets, {} objects, {}-{} spp)",
        width,
        height,
        total,
        scene.len(),
        config.min_samples,
        config.max_samples
    );
    let start = Instant::now();

    let results = buckets
        .par_iter()
        .map(|bucket| {
            let result = render_bucket(bucket, scene, camera, config, cancel)?;
            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            if done % config.progress_interval == 0 || done == total {
                log::info!("{}/{} buckets", done, total);
            }
            Ok(result)
        })
        .collect::<RenderResult<Vec<BucketResult>>>()?;

    let mut image = ImageBuffer::new(width, height);
    let mut samples = 0;
    let mut degenerate = 0;
    for result in &results {
        image.write_bucket(result);
        samples += result.samples;
        degenerate += result.degenerate;
    }

    if degenerate > 0 {
        log::warn!("{} samples hit degenerate geometry", degenerate);
    }
    log::info!(
        "Rendered in {:?} ({} samples, {:.1} per pixel)",
        start.elapsed(),
        samples,
        samples as f64 / (width as f64 * height as f64).max(1.0)
    );
    Ok(image)
}
