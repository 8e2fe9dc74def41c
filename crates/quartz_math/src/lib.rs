//! Quartz math - vectors, tensors and root finding.
//!
//! Surfaces in Quartz live in an arbitrary dimension, so points are plain
//! `Vec<f64>` values manipulated through [`vector`]. Colors and the 3-D camera
//! use glam, which is re-exported for convenience.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;
pub mod roots;
pub mod tensor;
pub mod vector;

pub use interval::Interval;
pub use ray::Ray;
pub use tensor::{SymmetricTensor, TensorError, TensorResult};
