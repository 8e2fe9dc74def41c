//! Symmetric tensors for polynomial coefficients.
//!
//! A rank-k symmetric tensor over dimension N is stored with one coefficient
//! per multi-index in non-increasing order (`i1 >= i2 >= ... >= ik`), so the
//! storage size is `C(N + k - 1, k)` instead of `N^k`. Each stored value is the
//! coefficient of the monomial `x[i1] * x[i2] * ... * x[ik]`; permutations of
//! the same indices refer to the same slot.
//!
//! Storage order is lexicographic over the sorted multi-indices, which is
//! exactly the order of the combinatorial number system, so offsets are
//! computed in closed form rather than searched for.

use thiserror::Error;

/// Errors that can occur when building a tensor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("expected {expected} coefficients, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("index {index} out of range for dimension {dimension}")]
    IndexOutOfRange { index: usize, dimension: usize },

    #[error("expected {expected} indices, found {found}")]
    RankMismatch { expected: usize, found: usize },
}

pub type TensorResult<T> = Result<T, TensorError>;

/// Binomial coefficient `C(n, k)`, zero when `k > n`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Number of stored coefficients for a symmetric tensor.
pub fn storage_len(dimension: usize, rank: usize) -> usize {
    if dimension == 0 {
        return usize::from(rank == 0);
    }
    binomial(dimension + rank - 1, rank)
}

/// All non-increasing multi-indices in storage order.
pub fn multi_indices(dimension: usize, rank: usize) -> Vec<Vec<usize>> {
    fn fill(dimension: usize, rank: usize, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if prefix.len() == rank {
            out.push(prefix.clone());
            return;
        }
        let upper = prefix.last().map_or(dimension, |&last| last + 1);
        for i in 0..upper {
            prefix.push(i);
            fill(dimension, rank, prefix, out);
            prefix.pop();
        }
    }

    let mut out = Vec::with_capacity(storage_len(dimension, rank));
    fill(dimension, rank, &mut Vec::with_capacity(rank), &mut out);
    out
}

/// A symmetric tensor of fixed rank and dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricTensor {
    dimension: usize,
    rank: usize,
    coefficients: Vec<f64>,
    indices: Vec<Vec<usize>>,
}

impl SymmetricTensor {
    /// Create a zero tensor.
    pub fn zeros(dimension: usize, rank: usize) -> Self {
        let indices = multi_indices(dimension, rank);
        Self {
            dimension,
            rank,
            coefficients: vec![0.0; indices.len()],
            indices,
        }
    }

    /// Create a tensor from coefficients already in storage order.
    pub fn from_coefficients(
        dimension: usize,
        rank: usize,
        coefficients: Vec<f64>,
    ) -> TensorResult<Self> {
        let expected = storage_len(dimension, rank);
        if coefficients.len() != expected {
            return Err(TensorError::LengthMismatch {
                expected,
                found: coefficients.len(),
            });
        }
        Ok(Self {
            dimension,
            rank,
            coefficients,
            indices: multi_indices(dimension, rank),
        })
    }

    /// Create a tensor by evaluating `f` at every stored multi-index.
    pub fn from_fn(dimension: usize, rank: usize, f: impl Fn(&[usize]) -> f64) -> Self {
        let indices = multi_indices(dimension, rank);
        let coefficients = indices.iter().map(|idx| f(idx)).collect();
        Self {
            dimension,
            rank,
            coefficients,
            indices,
        }
    }

    /// A rank-1 tensor holding `v`.
    pub fn vector(v: &[f64]) -> Self {
        Self::from_fn(v.len(), 1, |idx| v[idx[0]])
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Stored coefficients in storage order.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Iterate over `(multi_index, coefficient)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&[usize], f64)> + '_ {
        self.indices
            .iter()
            .map(Vec::as_slice)
            .zip(self.coefficients.iter().copied())
    }

    /// True if every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(|&c| c == 0.0)
    }

    /// Storage offset of a multi-index given in any order.
    pub fn offset(&self, indices: &[usize]) -> TensorResult<usize> {
        if indices.len() != self.rank {
            return Err(TensorError::RankMismatch {
                expected: self.rank,
                found: indices.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= self.dimension) {
            return Err(TensorError::IndexOutOfRange {
                index,
                dimension: self.dimension,
            });
        }

        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        let k = self.rank;
        Ok(sorted
            .iter()
            .enumerate()
            .map(|(m, &i)| binomial(i + k - m - 1, k - m))
            .sum())
    }

    /// Coefficient of the monomial named by `indices`.
    pub fn get(&self, indices: &[usize]) -> TensorResult<f64> {
        Ok(self.coefficients[self.offset(indices)?])
    }

    /// Overwrite the coefficient of the monomial named by `indices`.
    pub fn set(&mut self, indices: &[usize], value: f64) -> TensorResult<()> {
        let offset = self.offset(indices)?;
        self.coefficients[offset] = value;
        Ok(())
    }

    /// Full contraction with `x`: the value of the homogeneous polynomial.
    pub fn contract(&self, x: &[f64]) -> f64 {
        self.entries()
            .filter(|(_, c)| *c != 0.0)
            .map(|(idx, c)| c * idx.iter().map(|&i| x[i]).product::<f64>())
            .sum()
    }

    /// Add the gradient of the homogeneous polynomial at `x` into `out`.
    ///
    /// Every leg of a monomial contributes, so an off-diagonal entry such as
    /// `x0 * x1` adds to both partial derivatives.
    pub fn accumulate_gradient(&self, x: &[f64], out: &mut [f64]) {
        for (idx, c) in self.entries().filter(|(_, c)| *c != 0.0) {
            for leg in 0..idx.len() {
                let rest: f64 = idx
                    .iter()
                    .enumerate()
                    .filter(|&(m, _)| m != leg)
                    .map(|(_, &i)| x[i])
                    .product();
                out[idx[leg]] += c * rest;
            }
        }
    }

    /// Add the univariate polynomial obtained by substituting
    /// `x = origin + u * direction` into `out`, indexed by power of `u`.
    ///
    /// `out` must have room for `rank + 1` coefficients.
    pub fn accumulate_along(&self, origin: &[f64], direction: &[f64], out: &mut [f64]) {
        let mut term = vec![0.0_f64; self.rank + 1];
        for (idx, c) in self.entries().filter(|(_, c)| *c != 0.0) {
            term.fill(0.0);
            term[0] = c;
            for (degree, &i) in idx.iter().enumerate() {
                let (o, d) = (origin[i], direction[i]);
                for j in (1..=degree + 1).rev() {
                    term[j] = term[j] * o + term[j - 1] * d;
                }
                term[0] *= o;
            }
            for (slot, value) in out.iter_mut().zip(&term) {
                *slot += value;
            }
        }
    }
}
