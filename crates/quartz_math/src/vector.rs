//! Small helpers for N-dimensional vectors stored as `[f64]` slices.
//!
//! Surfaces in Quartz are defined over an arbitrary dimension, so points and
//! directions are plain `Vec<f64>` rather than a fixed-size glam type. The
//! helpers here are pure and allocate their results.

use glam::DVec3;

/// Dot product. Extra components of the longer slice are ignored.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Squared Euclidean length.
#[inline]
pub fn length_squared(v: &[f64]) -> f64 {
    dot(v, v)
}

/// Euclidean length.
#[inline]
pub fn length(v: &[f64]) -> f64 {
    length_squared(v).sqrt()
}

/// Component-wise `a + b`.
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// Component-wise `a - b`.
pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// `s * v`.
pub fn scale(v: &[f64], s: f64) -> Vec<f64> {
    v.iter().map(|x| x * s).collect()
}

/// `a + s * b`, the point at parameter `s` along a line.
pub fn add_scaled(a: &[f64], b: &[f64], s: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + s * y).collect()
}

/// Unit vector in the direction of `v`.
///
/// Returns the zero vector when `v` has zero length; callers treat that as a
/// degenerate direction. Non-finite input stays non-finite.
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let len = length(v);
    if len == 0.0 {
        vec![0.0; v.len()]
    } else {
        scale(v, 1.0 / len)
    }
}

/// Reflect `d` about the unit normal `n`: `d - 2 (n·d) n`.
pub fn reflect(d: &[f64], n: &[f64]) -> Vec<f64> {
    add_scaled(d, n, -2.0 * dot(n, d))
}

/// True if every component is finite.
#[inline]
pub fn is_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// True if every component is exactly zero.
#[inline]
pub fn is_zero(v: &[f64]) -> bool {
    v.iter().all(|&x| x == 0.0)
}

/// Matrix-vector product for a row-major square matrix.
pub fn mat_mul(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

/// Transposed matrix-vector product `mᵀ v` for a row-major matrix.
pub fn mat_mul_transposed(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    let cols = m.first().map_or(0, |row| row.len());
    let mut out = vec![0.0; cols];
    for (row, &vi) in m.iter().zip(v) {
        for (o, &mij) in out.iter_mut().zip(row) {
            *o += mij * vi;
        }
    }
    out
}

/// Convert a glam vector to a 3-component slice vector.
pub fn from_dvec3(v: DVec3) -> Vec<f64> {
    v.to_array().to_vec()
}
