//! Adaptive per-pixel sampling.
//!
//! A pixel keeps taking samples until either the sample ceiling is reached or,
//! past the floor, the variance of the mean has dropped below the threshold
//! in every channel.

use rand::RngCore;

use crate::camera::Camera;
use crate::cancel::CancelToken;
use crate::error::{RenderError, RenderResult, TraceError};
use crate::renderer::RenderConfig;
use crate::scene::Scene;
use crate::stats::SampleStats;
use crate::Color;

/// Outcome of sampling one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSample {
    /// Mean color of the valid samples.
    pub mean: Color,
    /// Samples taken, including discarded ones.
    pub samples: usize,
    /// Samples discarded for degenerate geometry.
    pub degenerate: usize,
    /// Whether sampling stopped on convergence rather than the ceiling.
    pub converged: bool,
}

/// Seed for the random stream of pixel `index`.
pub fn pixel_seed(seed: u64, index: u64) -> u64 {
    seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Sample pixel `(x, y)` until it converges or hits the sample ceiling.
///
/// Samples that fail on degenerate geometry count toward the ceiling but are
/// not folded into the statistics. A pixel with no valid sample at all is an
/// error.
pub fn sample_pixel(
    scene: &Scene,
    camera: &dyn Camera,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    cancel: &CancelToken,
) -> RenderResult<PixelSample> {
    let mut stats = SampleStats::new();
    let mut taken = 0;
    let mut degenerate = 0;
    let mut converged = false;

    loop {
        if taken >= config.max_samples {
            break;
        }
        if taken >= config.min_samples && stats.converged(config.variance_threshold) {
            converged = true;
            break;
        }

        let ray = camera.get_ray(x, y, rng);
        match scene.trace_path(ray, config, rng, cancel) {
            Ok(outcome) => stats.push(outcome.color),
            Err(TraceError::DegenerateGeometry { surface }) => {
                log::debug!("Pixel ({}, {}): degenerate sample at surface {:?}", x, y, surface);
                degenerate += 1;
            }
            Err(TraceError::Cancelled) => return Err(RenderError::Cancelled),
            Err(err) => {
                log::warn!("Pixel ({}, {}): {}", x, y, err);
                return Err(err.into());
            }
        }
        taken += 1;
    }

    if stats.count() == 0 {
        return Err(RenderError::NoValidSamples { x, y });
    }

    log::trace!(
        "Pixel ({}, {}): {} samples, converged = {}, mean variance = {:?}",
        x,
        y,
        taken,
        converged,
        stats.mean_variance()
    );

    Ok(PixelSample {
        mean: stats.mean(),
        samples: taken,
        degenerate,
        converged,
    })
}
