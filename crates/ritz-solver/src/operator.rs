//! Operator trait for matrix-free matrix-vector products.
//!
//! The solver never sees the matrix behind an operator, only its action on a
//! vector. Dense, sparse and implicit representations all plug in through
//! [`LinearOperator`].

use nalgebra::DMatrix;

/// A square linear operator that computes y = A * x for real (f64) vectors.
///
/// Implementations must be deterministic and must not modify `x`. The
/// `Send + Sync` bound lets independent solvers share one operator across
/// threads.
pub trait LinearOperator: Send + Sync {
    /// Dimension of the operator (N x N).
    fn dim(&self) -> usize;

    /// Apply the operator: y = A * x.
    ///
    /// `x` and `y` are f64 vectors of length `dim()`. Every entry of `y` is
    /// overwritten.
    fn apply(&self, x: &[f64], y: &mut [f64]);

    /// Row and column count. Operators are expected to be square; the solver
    /// rejects any other shape.
    fn shape(&self) -> (usize, usize) {
        (self.dim(), self.dim())
    }
}

impl<T: LinearOperator + ?Sized> LinearOperator for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        (**self).apply(x, y)
    }

    fn shape(&self) -> (usize, usize) {
        (**self).shape()
    }
}

impl<T: LinearOperator + ?Sized> LinearOperator for Box<T> {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        (**self).apply(x, y)
    }

    fn shape(&self) -> (usize, usize) {
        (**self).shape()
    }
}

/// Dense nalgebra matrices act as operators directly.
///
/// `dim()` reports the row count and `shape()` the full matrix shape, so a
/// non-square matrix is rejected before any product is taken.
impl LinearOperator for DMatrix<f64> {
    fn dim(&self) -> usize {
        self.nrows()
    }

    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(self.nrows(), self.ncols(), "operator must be square");
        assert_eq!(x.len(), self.ncols());
        assert_eq!(y.len(), self.nrows());

        // Column-major storage: accumulate one column at a time.
        y.fill(0.0);
        for (j, &xj) in x.iter().enumerate() {
            if xj == 0.0 {
                continue;
            }
            for (yi, &aij) in y.iter_mut().zip(self.column(j).iter()) {
                *yi += aij * xj;
            }
        }
    }
}

/// The spectrally shifted operator A + sigma * I.
///
/// Shifting moves every eigenvalue by `sigma` and keeps the eigenvectors.
/// For a symmetric A with spectrum in [lo, hi], running power iteration on
/// A - hi * I converges to the eigenvector of `lo`; [`unshift`] maps the
/// resulting Ritz value back.
///
/// [`unshift`]: ShiftedOperator::unshift
pub struct ShiftedOperator<'a, A: LinearOperator + ?Sized> {
    inner: &'a A,
    shift: f64,
}

impl<'a, A: LinearOperator + ?Sized> ShiftedOperator<'a, A> {
    pub fn new(inner: &'a A, shift: f64) -> Self {
        Self { inner, shift }
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }

    pub fn inner(&self) -> &'a A {
        self.inner
    }

    /// Map an eigenvalue of A + sigma * I back to the eigenvalue of A.
    pub fn unshift(&self, eigenvalue: f64) -> f64 {
        eigenvalue - self.shift
    }
}

impl<A: LinearOperator + ?Sized> LinearOperator for ShiftedOperator<'_, A> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn shape(&self) -> (usize, usize) {
        self.inner.shape()
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        self.inner.apply(x, y);
        if self.shift != 0.0 {
            for (yi, &xi) in y.iter_mut().zip(x) {
                *yi += self.shift * xi;
            }
        }
    }
}
