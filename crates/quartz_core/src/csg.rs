//! Constructive solid geometry over implicit surfaces.
//!
//! A CSG node combines two surfaces of the same dimension into one. The field
//! is the pointwise max (union) or min (intersection, difference) of the
//! children, and the ray hits are the children's hits filtered by whether the
//! hit point lies inside the other child.

use quartz_math::{vector, Ray};

use crate::error::{check_dimension, GeometryResult};
use crate::surface::{filter_hits, Surface, SurfaceRef};

/// Boolean operation applied by a [`Csg`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsgOp {
    /// Points inside either child.
    Union,
    /// Points inside both children.
    Intersection,
    /// Points inside `a` but not `b`.
    Difference,
    /// Intersection where `a` is a cheap bound around `b`: rays missing `a`
    /// entirely skip `b`.
    Bounding,
    /// Only `b`'s hits inside `a`; the shell of `a` is invisible. `b` is
    /// queried from where the ray enters `a`, so free-flight media measure
    /// their distance inside the bound.
    OpenBounding,
}

/// Two surfaces combined by a boolean operation.
#[derive(Debug, Clone)]
pub struct Csg {
    op: CsgOp,
    a: SurfaceRef,
    b: SurfaceRef,
}

impl Csg {
    /// Combine two surfaces. Fails if their dimensions differ.
    pub fn new(op: CsgOp, a: SurfaceRef, b: SurfaceRef) -> GeometryResult<Self> {
        check_dimension(a.dimension(), b.dimension())?;
        log::debug!("CSG {:?} node in {} dimensions", op, a.dimension());
        Ok(Self { op, a, b })
    }

    pub fn union(a: SurfaceRef, b: SurfaceRef) -> GeometryResult<Self> {
        Self::new(CsgOp::Union, a, b)
    }

    pub fn intersection(a: SurfaceRef, b: SurfaceRef) -> GeometryResult<Self> {
        Self::new(CsgOp::Intersection, a, b)
    }

    /// `a` with `b` carved out of it.
    pub fn difference(a: SurfaceRef, b: SurfaceRef) -> GeometryResult<Self> {
        Self::new(CsgOp::Difference, a, b)
    }

    /// `b` clipped to the bound `a`.
    ///
    /// Equivalent to [`Csg::intersection`] for a closed bound, but rays that
    /// never cross `a` do not evaluate `b` at all.
    pub fn bounding(bound: SurfaceRef, inner: SurfaceRef) -> GeometryResult<Self> {
        Self::new(CsgOp::Bounding, bound, inner)
    }

    /// The parts of `inner` inside `bound`, with `bound` itself never hit.
    pub fn open_bounding(bound: SurfaceRef, inner: SurfaceRef) -> GeometryResult<Self> {
        Self::new(CsgOp::OpenBounding, bound, inner)
    }

    pub fn op(&self) -> CsgOp {
        self.op
    }

    pub fn children(&self) -> (&SurfaceRef, &SurfaceRef) {
        (&self.a, &self.b)
    }
}

impl Surface for Csg {
    fn dimension(&self) -> usize {
        self.a.dimension()
    }

    fn value(&self, x: &[f64]) -> f64 {
        let fa = self.a.value(x);
        match self.op {
            CsgOp::Union => fa.max(self.b.value(x)),
            CsgOp::Intersection | CsgOp::Bounding | CsgOp::OpenBounding => {
                fa.min(self.b.value(x))
            }
            CsgOp::Difference => fa.min(-self.b.value(x)),
        }
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let fa = self.a.value(x);
        let fb = self.b.value(x);
        match self.op {
            CsgOp::Union if fa >= fb => self.a.gradient(x),
            CsgOp::Union => self.b.gradient(x),
            CsgOp::Intersection | CsgOp::Bounding if fa < fb => self.a.gradient(x),
            CsgOp::Intersection | CsgOp::Bounding => self.b.gradient(x),
            // Every reported hit belongs to b.
            CsgOp::OpenBounding => self.b.gradient(x),
            CsgOp::Difference if fa < -fb => self.a.gradient(x),
            CsgOp::Difference => vector::scale(&self.b.gradient(x), -1.0),
        }
    }

    fn intersections(&self, ray: &Ray) -> Vec<f64> {
        let (a, b) = (&self.a, &self.b);
        match self.op {
            CsgOp::Union => {
                let mut hits = filter_hits(ray, a.intersections(ray), |p| !b.contains(p));
                hits.extend(filter_hits(ray, b.intersections(ray), |p| !a.contains(p)));
                hits
            }
            CsgOp::Intersection => {
                let mut hits = filter_hits(ray, a.intersections(ray), |p| b.contains(p));
                hits.extend(filter_hits(ray, b.intersections(ray), |p| a.contains(p)));
                hits
            }
            CsgOp::Difference => {
                let mut hits = filter_hits(ray, a.intersections(ray), |p| !b.contains(p));
                hits.extend(filter_hits(ray, b.intersections(ray), |p| a.contains(p)));
                hits
            }
            CsgOp::Bounding => {
                let bound_hits = a.intersections(ray);
                if bound_hits.is_empty() {
                    return bound_hits;
                }
                let mut hits = filter_hits(ray, bound_hits, |p| b.contains(p));
                hits.extend(filter_hits(ray, b.intersections(ray), |p| a.contains(p)));
                hits
            }
            CsgOp::OpenBounding => {
                let start = if a.contains(ray.origin()) {
                    0.0
                } else {
                    let entry = a
                        .intersections(ray)
                        .into_iter()
                        .filter(|&u| u > 0.0)
                        .min_by(f64::total_cmp);
                    match entry {
                        Some(u) => u,
                        None => return Vec::new(),
                    }
                };
                let entered = Ray::new(ray.at(start), ray.direction().to_vec());
                let hits = b.intersections(&entered).into_iter().map(|u| u + start).collect();
                filter_hits(ray, hits, |p| a.contains(p))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::primitives::{Mist, Plane, Sphere};
    use std::sync::Arc;

    fn sphere(center: [f64; 3], r2: f64) -> SurfaceRef {
        Arc::new(Sphere::new(center.to_vec(), r2).unwrap())
    }

    fn sorted(mut roots: Vec<f64>) -> Vec<f64> {
        roots.sort_by(f64::total_cmp);
        roots
    }

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    fn axis_ray() -> Ray {
        Ray::new(vec![-10.0, 0.0, 0.0], vec![1.0, 0.0, 0.0])
    }

    /// Two unit spheres at x = -0.5 and x = 0.5 overlap on [-0.5, 0.5].
    fn pair() -> (SurfaceRef, SurfaceRef) {
        (sphere([-0.5, 0.0, 0.0], 1.0), sphere([0.5, 0.0, 0.0], 1.0))
    }

    #[test]
    fn test_union_hits_outer_shell_only() {
        let (a, b) = pair();
        let union = Csg::union(a, b).unwrap();
        // Shell spans x in [-1.5, 1.5]
        assert!(close(&sorted(union.intersections(&axis_ray())), &[8.5, 11.5]));
    }

    #[test]
    fn test_intersection_hits_lens() {
        let (a, b) = pair();
        let lens = Csg::intersection(a, b).unwrap();
        assert!(close(&sorted(lens.intersections(&axis_ray())), &[9.5, 10.5]));
    }

    #[test]
    fn test_difference_hits_crescent() {
        let (a, b) = pair();
        let crescent = Csg::difference(a, b).unwrap();
        // a spans [-1.5, 0.5], b removes [-0.5, 1.5]
        assert!(close(&sorted(crescent.intersections(&axis_ray())), &[8.5, 9.5]));
        assert!(crescent.contains(&[-1.0, 0.0, 0.0]));
        assert!(!crescent.contains(&[0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_bounding_matches_intersection() {
        let bound = sphere([0.0, 0.0, 0.0], 9.0);
        let inner = sphere([0.5, 0.0, 0.0], 1.0);
        let bounded = Csg::bounding(bound.clone(), inner.clone()).unwrap();
        let plain = Csg::intersection(bound, inner).unwrap();

        for ray in [
            axis_ray(),
            Ray::new(vec![0.0, -10.0, 0.2], vec![0.05, 1.0, 0.0]),
            Ray::new(vec![0.0, 10.0, 10.0], vec![0.0, 0.0, 1.0]),
        ] {
            assert!(close(
                &sorted(bounded.intersections(&ray)),
                &sorted(plain.intersections(&ray))
            ));
        }
    }

    /// Counts how often its intersections are requested.
    #[derive(Debug, Default)]
    struct Counting(std::sync::atomic::AtomicUsize);

    impl Surface for Counting {
        fn dimension(&self) -> usize {
            3
        }
        fn value(&self, _x: &[f64]) -> f64 {
            1.0
        }
        fn gradient(&self, _x: &[f64]) -> Vec<f64> {
            vec![0.0; 3]
        }
        fn intersections(&self, _ray: &Ray) -> Vec<f64> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            vec![1.0]
        }
    }

    #[test]
    fn test_bounding_skips_inner_on_miss() {
        let counting = Arc::new(Counting::default());
        let bound = sphere([0.0, 0.0, 0.0], 1.0);
        let bounded = Csg::bounding(bound, counting.clone()).unwrap();

        let miss = Ray::new(vec![0.0, 5.0, -10.0], vec![0.0, 0.0, 1.0]);
        assert!(bounded.intersections(&miss).is_empty());
        assert_eq!(counting.0.load(std::sync::atomic::Ordering::Relaxed), 0);

        bounded.intersections(&axis_ray());
        assert_eq!(counting.0.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn test_open_bounding_hides_bound_shell() {
        let bound = sphere([0.0, 0.0, 0.0], 4.0);
        let inner = sphere([0.0, 0.0, 0.0], 1.0);
        let open = Csg::open_bounding(bound, inner).unwrap();
        assert!(close(&sorted(open.intersections(&axis_ray())), &[9.0, 11.0]));

        // Inner surface poking out of the bound is clipped away.
        let bound = sphere([0.0, 0.0, 0.0], 1.0);
        let inner = sphere([1.0, 0.0, 0.0], 1.0);
        let open = Csg::open_bounding(bound, inner).unwrap();
        assert!(close(&sorted(open.intersections(&axis_ray())), &[10.0]));
    }

    #[test]
    fn test_open_bounding_mist_starts_at_entry() {
        let mist: SurfaceRef = Arc::new(Mist::new(3, 0.5, 3).unwrap());
        let rays = |z: f64| {
            (0..400).map(move |i| {
                let dx = (i % 20) as f64 * 1e-4;
                let dy = (i / 20) as f64 * 1e-4;
                (z, Ray::new(vec![0.0, 0.0, 0.0], vec![dx, dy, -1.0]))
            })
        };

        // The same cloud near and far is equally dense.
        let mut counts = Vec::new();
        for z in [-3.0, -40.0] {
            let cloud =
                Csg::open_bounding(sphere([0.0, 0.0, z], 1.0), mist.clone()).unwrap();
            let mut hits = 0;
            for (_, ray) in rays(z) {
                let roots = cloud.intersections(&ray);
                assert!(roots.len() <= 1);
                if let Some(&u) = roots.first() {
                    let p = ray.at(u);
                    assert!(cloud.contains(&p));
                    assert_eq!(cloud.value(&p), 0.0);
                    assert_eq!(cloud.gradient(&p), vec![0.0; 3]);
                    hits += 1;
                }
            }
            counts.push(hits);
        }
        // Chord of about 2 with mean free path 0.5: nearly every ray scatters.
        assert!(counts.iter().all(|&n| n > 350), "{counts:?}");
    }

    #[test]
    fn test_open_bounding_from_inside_and_missing() {
        let bound = sphere([0.0, 0.0, 0.0], 4.0);
        let inner = sphere([0.0, 0.0, 0.0], 1.0);
        let open = Csg::open_bounding(bound, inner).unwrap();

        let inside = Ray::new(vec![-1.5, 0.0, 0.0], vec![1.0, 0.0, 0.0]);
        assert!(close(&sorted(open.intersections(&inside)), &[0.5, 2.5]));

        let miss = Ray::new(vec![0.0, 5.0, -10.0], vec![0.0, 0.0, 1.0]);
        assert!(open.intersections(&miss).is_empty());
    }

    #[test]
    fn test_union_and_intersection_interior_algebra() {
        let (a, b) = pair();
        let union = Csg::union(a.clone(), b.clone()).unwrap();
        let inter = Csg::intersection(a.clone(), b.clone()).unwrap();

        for i in -20..=20 {
            for j in -4..=4 {
                let p = [i as f64 * 0.1, j as f64 * 0.3, 0.1];
                assert_eq!(union.contains(&p), a.contains(&p) || b.contains(&p));
                assert_eq!(inter.contains(&p), a.contains(&p) && b.contains(&p));
            }
        }
    }

    #[test]
    fn test_gradient_tie_breaks() {
        let a: SurfaceRef = Arc::new(Plane::new(vec![1.0, 0.0], &[0.0, 0.0]).unwrap());
        let b: SurfaceRef = Arc::new(Plane::new(vec![0.0, 1.0], &[0.0, 0.0]).unwrap());
        let origin = [0.0, 0.0];

        // Fa == Fb at the origin: union favors a, intersection favors b.
        let union = Csg::union(a.clone(), b.clone()).unwrap();
        assert_eq!(union.gradient(&origin), vec![-1.0, 0.0]);
        let inter = Csg::intersection(a.clone(), b.clone()).unwrap();
        assert_eq!(inter.gradient(&origin), vec![0.0, -1.0]);

        // Difference flips the carved child's gradient.
        let diff = Csg::difference(a, b).unwrap();
        assert_eq!(diff.gradient(&[-1.0, 0.5]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let a = sphere([0.0, 0.0, 0.0], 1.0);
        let b: SurfaceRef = Arc::new(Sphere::new(vec![0.0, 0.0], 1.0).unwrap());
        let err = Csg::union(a, b).unwrap_err();
        assert_eq!(err, GeometryError::DimensionMismatch { expected: 3, found: 2 });
    }
}
