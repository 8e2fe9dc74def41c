//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::cancel::CancelToken;
use crate::error::RenderResult;
use crate::renderer::{color_to_rgba, RenderConfig};
use crate::sampler::{pixel_seed, sample_pixel};
use crate::scene::Scene;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets are handed out from the center outward so the middle of the image
/// finishes first.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;
    let distance = |b: &Bucket| {
        let x = b.x as f64 + b.width as f64 / 2.0;
        let y = b.y as f64 + b.height as f64 / 2.0;
        (x - center_x).powi(2) + (y - center_y).powi(2)
    };

    // Stable sort keeps row-major order between equidistant buckets.
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Result of rendering a bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<[u8; 4]>,
    /// Samples taken across the bucket
    pub samples: usize,
    /// Samples discarded for degenerate geometry
    pub degenerate: usize,
}

/// Render a single bucket.
///
/// Each pixel is sampled with its own generator seeded from the config seed
/// and the pixel's index in the full image.
pub fn render_bucket(
    bucket: &Bucket,
    scene: &Scene,
    camera: &dyn Camera,
    config: &RenderConfig,
    cancel: &CancelToken,
) -> RenderResult<BucketResult> {
    let (image_width, _) = camera.resolution();
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    let mut samples = 0;
    let mut degenerate = 0;

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let x = bucket.x + local_x;
            let y = bucket.y + local_y;
            let index = y as u64 * image_width as u64 + x as u64;
            let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, index));

            let pixel = sample_pixel(scene, camera, x, y, config, &mut rng, cancel)?;
            samples += pixel.samples;
            degenerate += pixel.degenerate;
            pixels.push(color_to_rgba(pixel.mean));
        }
    }

    Ok(BucketResult {
        bucket: *bucket,
        pixels,
        samples,
        degenerate,
    })
}
