//! Scenes and the path tracing loop.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quartz_core::{GeometryError, SurfaceRef};
use quartz_math::{vector, Interval, Ray};
use rand::RngCore;

use crate::cancel::CancelToken;
use crate::error::{RenderResult, TraceError};
use crate::light_ray::LightRay;
use crate::renderer::RenderConfig;
use crate::selector::InteractionSelector;
use crate::Color;

/// Color seen by a path that escapes in a given direction.
pub type Background = Arc<dyn Fn(&[f64]) -> Color + Send + Sync>;

/// A surface and the selector for its interactions.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub surface: SurfaceRef,
    pub selector: Arc<dyn InteractionSelector>,
}

/// How a traced path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    /// Left the scene and picked up the background.
    Escaped,
    /// Redirected share fell to the cutoff.
    Absorbed,
    /// Ran out of bounces.
    DepthExhausted,
}

/// Result of tracing one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceOutcome {
    pub color: Color,
    pub state: TraceState,
    /// Number of surface interactions along the path.
    pub depth: usize,
}

/// An ordered list of surfaces with their materials, plus a background.
///
/// Scenes are built once and then shared immutably between render threads.
pub struct Scene {
    dimension: usize,
    objects: Vec<SceneObject>,
    background: Background,
    degenerate_normals: AtomicUsize,
}

impl Scene {
    /// An empty scene in `dimension` dimensions with a black background.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            objects: Vec::new(),
            background: Arc::new(|_: &[f64]| Color::ZERO),
            degenerate_normals: AtomicUsize::new(0),
        }
    }

    /// Set the background as a function of the escape direction.
    pub fn with_background(
        mut self,
        background: impl Fn(&[f64]) -> Color + Send + Sync + 'static,
    ) -> Self {
        self.background = Arc::new(background);
        self
    }

    /// Set a constant background color.
    pub fn with_uniform_background(self, color: Color) -> Self {
        self.with_background(move |_| color)
    }

    /// Append a surface and return its index.
    pub fn add(
        &mut self,
        surface: SurfaceRef,
        selector: Arc<dyn InteractionSelector>,
    ) -> RenderResult<usize> {
        if surface.dimension() != self.dimension {
            return Err(GeometryError::DimensionMismatch {
                expected: self.dimension,
                found: surface.dimension(),
            }
            .into());
        }
        let index = self.objects.len();
        log::debug!("Scene object {} added: {:?}", index, surface);
        self.objects.push(SceneObject { surface, selector });
        Ok(index)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Hits so far where the surface had no normal.
    pub fn degenerate_normals(&self) -> usize {
        self.degenerate_normals.load(Ordering::Relaxed)
    }

    pub fn background(&self, direction: &[f64]) -> Color {
        (self.background)(direction)
    }

    /// Nearest strictly positive hit along `ray`, skipping the object at
    /// index `skip`. Returns the object index and ray parameter.
    pub fn nearest_hit(&self, ray: &Ray, skip: Option<usize>) -> Option<(usize, f64)> {
        let mut closest: Option<(usize, f64)> = None;
        for (index, object) in self.objects.iter().enumerate() {
            if Some(index) == skip {
                continue;
            }
            let range = closest.map_or(Interval::POSITIVE, |(_, u)| Interval::POSITIVE.with_max(u));
            if let Some(u) = object.surface.nearest_hit(ray, range) {
                closest = Some((index, u));
            }
        }
        closest
    }

    /// Follow one path from `ray` until it escapes, is absorbed, or runs out
    /// of bounces.
    pub fn trace_path(
        &self,
        ray: Ray,
        config: &RenderConfig,
        rng: &mut dyn RngCore,
        cancel: &CancelToken,
    ) -> Result<TraceOutcome, TraceError> {
        if cancel.is_cancelled() {
            return Err(TraceError::Cancelled);
        }

        let mut light = LightRay::new(ray);
        for _ in 0..config.max_depth {
            let probe = light.ray();
            let Some((index, u)) = self.nearest_hit(&probe, light.last_hit) else {
                let background = self.background(&light.direction);
                light.glow(background);
                return finish(light, TraceState::Escaped);
            };

            let object = &self.objects[index];
            let position = probe.at(u);
            let normal = object.surface.normal(&position);
            if !vector::is_finite(&position) || !vector::is_finite(&normal) {
                return Err(TraceError::DegenerateGeometry {
                    surface: Some(index),
                });
            }
            if vector::is_zero(&normal) {
                self.degenerate_normals.fetch_add(1, Ordering::Relaxed);
            }

            let model = object
                .selector
                .select(&position)
                .ok_or(TraceError::MissingInteraction { surface: index })?;

            light.position = position;
            model.interact(&mut light, &normal, rng);
            light.last_hit = Some(index);
            light.depth += 1;

            if light.redirected <= config.redirected_cutoff {
                return finish(light, TraceState::Absorbed);
            }
        }
        finish(light, TraceState::DepthExhausted)
    }
}

fn finish(light: LightRay, state: TraceState) -> Result<TraceOutcome, TraceError> {
    let color = light.derive_color();
    if !color.is_finite() {
        return Err(TraceError::DegenerateGeometry {
            surface: light.last_hit,
        });
    }
    Ok(TraceOutcome {
        color,
        state,
        depth: light.depth,
    })
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("dimension", &self.dimension)
            .field("objects", &self.objects)
            .finish_non_exhaustive()
    }
}

/// Sky gradient background: white looking down, blue looking up (+y).
pub fn sky_gradient(direction: &[f64]) -> Color {
    let unit = vector::normalize(direction);
    let a = 0.5 * (unit.get(1).copied().unwrap_or(0.0) + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{ColorOp, Lambertian, Mirror};
    use crate::InteractionModel;
    use quartz_core::{Plane, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    fn sphere(center: [f64; 3], r2: f64) -> SurfaceRef {
        Arc::new(Sphere::new(center.to_vec(), r2).unwrap())
    }

    fn trace(scene: &Scene, origin: [f64; 3], direction: [f64; 3], config: &RenderConfig) -> Result<TraceOutcome, TraceError> {
        let mut rng = StdRng::seed_from_u64(17);
        scene.trace_path(
            Ray::new(origin.to_vec(), direction.to_vec()),
            config,
            &mut rng,
            &CancelToken::new(),
        )
    }

    #[test]
    fn test_empty_scene_sees_background() {
        let scene = Scene::new(3).with_uniform_background(Color::new(0.2, 0.4, 0.6));
        let outcome = trace(&scene, [0.0; 3], [0.0, 0.0, -1.0], &config()).unwrap();
        assert_eq!(outcome.state, TraceState::Escaped);
        assert_eq!(outcome.color, Color::new(0.2, 0.4, 0.6));
        assert_eq!(outcome.depth, 0);
    }

    #[test]
    fn test_nearest_hit_picks_closest_and_skips_last() {
        let mut scene = Scene::new(3);
        let white: Arc<dyn InteractionSelector> = Arc::new(Lambertian::absorbing(Color::ONE));
        scene.add(sphere([0.0, 0.0, -10.0], 1.0), white.clone()).unwrap();
        scene.add(sphere([0.0, 0.0, -5.0], 1.0), white).unwrap();

        let ray = Ray::new(vec![0.0; 3], vec![0.0, 0.0, -1.0]);
        assert_eq!(scene.nearest_hit(&ray, None), Some((1, 4.0)));
        assert_eq!(scene.nearest_hit(&ray, Some(1)), Some((0, 9.0)));
    }

    #[test]
    fn test_glowing_hit_is_absorbed() {
        let mut scene = Scene::new(3);
        scene
            .add(sphere([0.0, 0.0, -5.0], 1.0), Arc::new(Lambertian::glowing(Color::splat(3.0))))
            .unwrap();
        let outcome = trace(&scene, [0.0; 3], [0.0, 0.0, -1.0], &config()).unwrap();
        assert_eq!(outcome.state, TraceState::Absorbed);
        assert_eq!(outcome.depth, 1);
        assert_eq!(outcome.color, Color::splat(3.0));
    }

    #[test]
    fn test_mirror_picks_up_background_behind() {
        let mut scene = Scene::new(3).with_background(|d: &[f64]| {
            if d[2] > 0.0 {
                Color::new(0.0, 1.0, 0.0)
            } else {
                Color::new(1.0, 0.0, 0.0)
            }
        });
        let plane: SurfaceRef = Arc::new(Plane::new(vec![0.0, 0.0, 1.0], &[0.0, 0.0, -2.0]).unwrap());
        scene
            .add(plane, Arc::new(Mirror::new(ColorOp::Absorb(Color::splat(0.5)))))
            .unwrap();

        let outcome = trace(&scene, [0.0; 3], [0.0, 0.0, -1.0], &config()).unwrap();
        assert_eq!(outcome.state, TraceState::Escaped);
        assert_eq!(outcome.depth, 1);
        assert_eq!(outcome.color, Color::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_cutoff_of_one_stops_after_first_bounce() {
        let mut scene = Scene::new(3).with_uniform_background(Color::ONE);
        // Camera inside a diffuse sphere: every bounce hits it again.
        scene
            .add(sphere([0.0; 3], 100.0), Arc::new(Lambertian::absorbing(Color::splat(0.5))))
            .unwrap();
        let config = config().with_redirected_cutoff(1.0);
        for direction in [[0.0, 0.0, -1.0], [1.0, 0.3, 0.0], [0.0, -1.0, 0.2]] {
            let outcome = trace(&scene, [0.0; 3], direction, &config).unwrap();
            assert_eq!(outcome.depth, 1);
            assert_eq!(outcome.state, TraceState::Absorbed);
        }
    }

    #[test]
    fn test_last_hit_is_skipped() {
        let mut scene = Scene::new(3);
        scene
            .add(sphere([0.0; 3], 100.0), Arc::new(Lambertian::absorbing(Color::splat(0.5))))
            .unwrap();
        // The only surface is excluded from the next search, so the path leaves.
        let outcome = trace(&scene, [0.0; 3], [0.0, 0.0, -1.0], &config()).unwrap();
        assert_eq!(outcome.state, TraceState::Escaped);
        assert_eq!(outcome.depth, 1);
    }

    #[test]
    fn test_depth_exhausted_keeps_throughput() {
        // Two facing planes bounce a diffuse path back and forth.
        let mut scene = Scene::new(3);
        let grey: Arc<dyn InteractionSelector> = Arc::new(Lambertian::absorbing(Color::splat(0.5)));
        let floor: SurfaceRef = Arc::new(Plane::new(vec![0.0, 0.0, 1.0], &[0.0, 0.0, -1.0]).unwrap());
        let ceiling: SurfaceRef = Arc::new(Plane::new(vec![0.0, 0.0, -1.0], &[0.0, 0.0, 1.0]).unwrap());
        scene.add(floor, grey.clone()).unwrap();
        scene.add(ceiling, grey).unwrap();

        let config = config().with_max_depth(3);
        let outcome = trace(&scene, [0.0; 3], [0.1, 0.0, -1.0], &config).unwrap();
        assert_eq!(outcome.state, TraceState::DepthExhausted);
        assert_eq!(outcome.depth, 3);
        assert_eq!(outcome.color, Color::splat(0.125));
    }

    #[test]
    fn test_missing_interaction_is_an_error() {
        let mut scene = Scene::new(3);
        let nothing: Arc<dyn InteractionSelector> = Arc::new(crate::FnSelector::new(
            Vec::<Arc<dyn InteractionModel>>::new(),
            |_| None,
        ));
        scene.add(sphere([0.0, 0.0, -5.0], 1.0), nothing).unwrap();
        let err = trace(&scene, [0.0; 3], [0.0, 0.0, -1.0], &config()).unwrap_err();
        assert_eq!(err, TraceError::MissingInteraction { surface: 0 });
    }

    #[test]
    fn test_cancelled_trace() {
        let scene = Scene::new(3);
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut rng = StdRng::seed_from_u64(0);
        let err = scene
            .trace_path(Ray::new(vec![0.0; 3], vec![1.0, 0.0, 0.0]), &config(), &mut rng, &cancel)
            .unwrap_err();
        assert_eq!(err, TraceError::Cancelled);
    }

    #[test]
    fn test_dimension_checked_on_add() {
        let mut scene = Scene::new(2);
        let err = scene
            .add(sphere([0.0; 3], 1.0), Arc::new(Lambertian::absorbing(Color::ONE)))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::RenderError::Geometry(GeometryError::DimensionMismatch { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_non_finite_background_is_degenerate() {
        let scene = Scene::new(3).with_uniform_background(Color::splat(f64::NAN));
        let err = trace(&scene, [0.0; 3], [0.0, 0.0, -1.0], &config()).unwrap_err();
        assert_eq!(err, TraceError::DegenerateGeometry { surface: None });

        // After a bounce the error names the surface the path left.
        let mut scene = Scene::new(3).with_uniform_background(Color::splat(f64::NAN));
        let plane: SurfaceRef = Arc::new(Plane::new(vec![0.0, 0.0, 1.0], &[0.0, 0.0, -2.0]).unwrap());
        scene
            .add(plane, Arc::new(Mirror::new(ColorOp::Absorb(Color::splat(0.5)))))
            .unwrap();
        let err = trace(&scene, [0.0; 3], [0.0, 0.0, -1.0], &config()).unwrap_err();
        assert_eq!(err, TraceError::DegenerateGeometry { surface: Some(0) });
    }

    #[test]
    fn test_sky_gradient() {
        let up = sky_gradient(&[0.0, 1.0, 0.0]);
        let down = sky_gradient(&[0.0, -1.0, 0.0]);
        assert!(up.x < down.x);
        assert_eq!(down, Color::ONE);
    }
}
