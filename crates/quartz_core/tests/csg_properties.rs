//! Cross-module properties of surfaces and CSG trees.

use std::sync::Arc;

use quartz_core::{
    CoordinateShift, Csg, Plane, PolynomialSurface, Sphere, Surface, SurfaceRef, Torus, Translate,
};
use quartz_math::{vector, Ray};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_ray(rng: &mut StdRng) -> Ray {
    let origin: Vec<f64> = (0..3).map(|_| rng.gen_range(-6.0..6.0)).collect();
    let target: Vec<f64> = (0..3).map(|_| rng.gen_range(-1.5..1.5)).collect();
    Ray::new(origin.clone(), vector::sub(&target, &origin))
}

fn sphere(center: [f64; 3], r2: f64) -> SurfaceRef {
    Arc::new(Sphere::new(center.to_vec(), r2).unwrap())
}

/// A small CSG tree mixing every node kind with quadric, quartic and planar
/// leaves.
fn sample_tree() -> Vec<SurfaceRef> {
    let torus: SurfaceRef = Arc::new(Torus::new(1.2, 0.4).unwrap());
    let tilted: SurfaceRef = Arc::new(
        CoordinateShift::rotation(0, 2, 0.6, vec![0.0, 0.0, 0.0], torus.clone()).unwrap(),
    );
    let ball: SurfaceRef = Arc::new(
        Sphere::new(vec![0.3, 0.0, 0.0], 1.0)
            .unwrap()
            .to_polynomial()
            .unwrap(),
    );
    let moved: SurfaceRef = Arc::new(Translate::new(vec![0.0, 0.5, 0.0], ball.clone()).unwrap());
    let floor: SurfaceRef = Arc::new(Plane::new(vec![0.0, 1.0, 0.0], &[0.0, 0.2, 0.0]).unwrap());

    let union: SurfaceRef = Arc::new(Csg::union(tilted.clone(), moved.clone()).unwrap());
    let carved: SurfaceRef = Arc::new(Csg::difference(union.clone(), floor.clone()).unwrap());
    let lens: SurfaceRef = Arc::new(Csg::intersection(ball.clone(), moved).unwrap());
    let bounded: SurfaceRef = Arc::new(Csg::bounding(sphere([0.0; 3], 4.0), tilted).unwrap());
    let open: SurfaceRef = Arc::new(Csg::open_bounding(ball, torus).unwrap());

    vec![union, carved, lens, bounded, open]
}

#[test]
fn test_every_hit_lies_on_the_combined_surface() {
    let mut rng = StdRng::seed_from_u64(2024);
    for surface in sample_tree() {
        for _ in 0..200 {
            let ray = random_ray(&mut rng);
            for u in surface.intersections(&ray) {
                let f = surface.value(&ray.at(u));
                assert!(f.abs() < 1e-5, "F = {f} at u = {u} for {surface:?}");
            }
        }
    }
}

#[test]
fn test_interior_algebra_on_random_points() {
    let a = sphere([-0.4, 0.1, 0.0], 1.0);
    let b: SurfaceRef = Arc::new(Torus::new(1.0, 0.5).unwrap());
    let union = Csg::union(a.clone(), b.clone()).unwrap();
    let inter = Csg::intersection(a.clone(), b.clone()).unwrap();
    let diff = Csg::difference(a.clone(), b.clone()).unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..2000 {
        let p: Vec<f64> = (0..3).map(|_| rng.gen_range(-2.0..2.0)).collect();
        let (ia, ib) = (a.contains(&p), b.contains(&p));
        assert_eq!(union.contains(&p), ia || ib);
        assert_eq!(inter.contains(&p), ia && ib);
        // Points exactly on b's shell count as inside b and so outside the difference.
        assert_eq!(diff.contains(&p), ia && b.value(&p) <= 0.0);
    }
}

#[test]
fn test_outward_normals_point_away_from_interior() {
    let mut rng = StdRng::seed_from_u64(77);
    for surface in sample_tree() {
        for _ in 0..100 {
            let ray = random_ray(&mut rng);
            for u in surface.intersections(&ray) {
                let p = ray.at(u);
                let n = surface.normal(&p);
                if vector::is_zero(&n) {
                    continue;
                }
                let outside = vector::add_scaled(&p, &n, 1e-4);
                let inside = vector::add_scaled(&p, &n, -1e-4);
                assert!(surface.value(&outside) <= surface.value(&inside));
            }
        }
    }
}

#[test]
fn test_general_quadric_matches_sphere() {
    // 1 - x^2 - y^2 - z^2 assembled by hand.
    let mut quadratic = quartz_math::SymmetricTensor::zeros(3, 2);
    for i in 0..3 {
        quadratic.set(&[i, i], -1.0).unwrap();
    }
    let by_hand = PolynomialSurface::quadratic(
        1.0,
        quartz_math::SymmetricTensor::zeros(3, 1),
        quadratic,
    )
    .unwrap();
    let unit = sphere([0.0; 3], 1.0);

    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let ray = random_ray(&mut rng);
        let mut a = by_hand.intersections(&ray);
        let mut b = unit.intersections(&ray);
        a.sort_by(f64::total_cmp);
        b.sort_by(f64::total_cmp);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-9);
        }
    }
}
