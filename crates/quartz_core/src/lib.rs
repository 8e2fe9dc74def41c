//! Quartz Core - implicit surfaces and constructive solid geometry.
//!
//! This crate provides:
//!
//! - **Polynomial surfaces**: `PolynomialSurface` of degree one to four,
//!   built from symmetric coefficient tensors
//! - **Primitives**: `Sphere`, `Plane`, `Torus` and the volumetric `Mist`
//! - **CSG**: `Csg` nodes combining two surfaces by `CsgOp`
//! - **Placement**: `Translate` and `CoordinateShift` wrappers
//!
//! Every object implements [`Surface`]: a scalar field whose non-negative
//! region is the solid, with exact ray intersections.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use quartz_core::{Csg, Sphere, Surface, SurfaceRef};
//! use quartz_math::Ray;
//!
//! let a: SurfaceRef = Arc::new(Sphere::new(vec![-0.5, 0.0, 0.0], 1.0)?);
//! let b: SurfaceRef = Arc::new(Sphere::new(vec![0.5, 0.0, 0.0], 1.0)?);
//! let lens = Csg::intersection(a, b)?;
//!
//! let ray = Ray::new(vec![-10.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]);
//! assert_eq!(lens.intersections(&ray).len(), 2);
//! # Ok::<(), quartz_core::GeometryError>(())
//! ```

pub mod csg;
pub mod error;
pub mod polynomial;
pub mod primitives;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use csg::{Csg, CsgOp};
pub use error::{GeometryError, GeometryResult};
pub use polynomial::{PolynomialSurface, MAX_DEGREE};
pub use primitives::{Mist, Plane, Sphere, Torus};
pub use surface::{Surface, SurfaceRef};
pub use transform::{CoordinateShift, Translate};
