//! CSG path tracer example.
//!
//! Renders a small scene of implicit surfaces and saves it to `quartz.png`.
//!
//! ```text
//! cargo run --release --example csg_render [settings.json]
//! ```
//!
//! The optional JSON file holds any subset of `RenderConfig` fields, e.g.
//! `{ "max_samples": 512, "variance_threshold": 1e-6 }`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use quartz_core::{
    CoordinateShift, Csg, Mist, Plane, Sphere, SurfaceRef, Torus, Translate,
};
use quartz_renderer::{
    render, sky_gradient, CancelToken, Checker, Color, ColorOp, Composite, DVec3,
    InteractionModel, Lambertian, Mirror, PinholeCamera, Refractive, RenderConfig, Scene,
    Specular,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading render settings from {path}"))?;
            serde_json::from_str::<RenderConfig>(&text)
                .with_context(|| format!("parsing render settings in {path}"))?
        }
        None => RenderConfig::default().with_samples(16, 256),
    };
    log::info!("Render settings: {}", serde_json::to_string(&config)?);

    let start = Instant::now();
    let scene = build_scene()?;
    log::info!("Scene built in {:?} ({} objects)", start.elapsed(), scene.len());

    let camera = PinholeCamera::new()
        .with_resolution(480, 320)
        .with_position(
            DVec3::new(0.0, 1.6, 6.0),  // look_from
            DVec3::new(0.0, 0.4, 0.0),  // look_at
            DVec3::new(0.0, 1.0, 0.0),  // vup
        )
        .with_hfov(55.0);

    let image = render(&scene, &camera, &config, &CancelToken::new())?;

    let filename = "quartz.png";
    image.save_png(filename)?;
    log::info!("Saved to {}", filename);
    if scene.degenerate_normals() > 0 {
        log::info!("{} hits had no surface normal (mist scattering)", scene.degenerate_normals());
    }
    Ok(())
}

fn sphere(center: [f64; 3], radius: f64) -> Result<SurfaceRef> {
    Ok(Arc::new(Sphere::new(center.to_vec(), radius * radius)?))
}

fn build_scene() -> Result<Scene> {
    let mut scene = Scene::new(3).with_background(sky_gradient);

    // Checkered ground
    let ground: SurfaceRef = Arc::new(Plane::new(vec![0.0, 1.0, 0.0], &[0.0, -0.5, 0.0])?);
    let light_tile: Arc<dyn InteractionModel> = Arc::new(Lambertian::absorbing(Color::splat(0.8)));
    let dark_tile: Arc<dyn InteractionModel> = Arc::new(Lambertian::absorbing(Color::splat(0.2)));
    scene.add(ground, Arc::new(Checker::new(light_tile, dark_tile, 1.0)))?;

    // Glass lens: intersection of two offset spheres
    let lens: SurfaceRef = Arc::new(Csg::intersection(
        sphere([-2.2, 0.5, 0.0], 1.2)?,
        sphere([-1.2, 0.5, 0.0], 1.2)?,
    )?);
    scene.add(lens, Arc::new(Refractive::new(1.5, ColorOp::Absorb(Color::new(0.95, 0.98, 1.0)))))?;

    // Mirror torus tilted back from the camera, bounded for cheap misses
    let torus: SurfaceRef = Arc::new(Torus::new(0.7, 0.25)?);
    let tilted: SurfaceRef = Arc::new(CoordinateShift::rotation(
        1,
        2,
        std::f64::consts::FRAC_PI_3,
        vec![0.0, 0.0, 0.0],
        torus,
    )?);
    let placed: SurfaceRef = Arc::new(Translate::new(vec![0.0, 0.45, -0.5], tilted)?);
    let bounded: SurfaceRef = Arc::new(Csg::bounding(sphere([0.0, 0.45, -0.5], 1.0)?, placed)?);
    scene.add(bounded, Arc::new(Mirror::new(ColorOp::Absorb(Color::new(0.9, 0.8, 0.6)))))?;

    // Glossy ball with a bite taken out, sometimes glowing
    let bitten: SurfaceRef = Arc::new(Csg::difference(
        sphere([2.0, 0.3, 0.3], 0.8)?,
        sphere([1.5, 0.8, 0.9], 0.5)?,
    )?);
    let glossy: Arc<dyn InteractionModel> =
        Arc::new(Specular::new(0.15, ColorOp::Absorb(Color::new(0.3, 0.5, 0.9))));
    let ember: Arc<dyn InteractionModel> = Arc::new(Lambertian::glowing(Color::new(4.0, 1.5, 0.5)));
    let mixed = Composite::new(vec![(0.9, 1.0, glossy), (0.1, 1.0, ember)])?;
    scene.add(bitten, Arc::new(mixed))?;

    // Mist cloud confined to a sphere, its shell invisible
    let mist: SurfaceRef = Arc::new(Mist::new(3, 0.8, 1)?);
    let cloud: SurfaceRef = Arc::new(Csg::open_bounding(sphere([0.8, 1.8, -2.0], 0.9)?, mist)?);
    scene.add(
        cloud,
        Arc::new(Lambertian::new(ColorOp::GlowAbsorbAverage {
            glow: Color::new(1.0, 0.9, 0.8),
            transmit: Color::splat(0.9),
            absorb: 0.2,
        })),
    )?;

    Ok(scene)
}
