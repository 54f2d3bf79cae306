//! Dense matrix operator backed by flat Vec storage.

use ritz_solver::{Error, LinearOperator, Result};

/// Dense NxN real (f64) matrix operator.
#[derive(Debug, Clone)]
pub struct RealDenseOperator {
    n: usize,
    /// Row-major storage: data[i*n + j] = A[i][j].
    data: Vec<f64>,
}

impl RealDenseOperator {
    /// Build from pre-computed matrix data (row-major).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperator`] if `data.len() != n * n`.
    pub fn from_data(n: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n * n {
            return Err(Error::InvalidOperator(format!(
                "data length {} doesn't match {}x{} matrix",
                data.len(),
                n,
                n
            )));
        }
        Ok(Self { n, data })
    }

    /// Build by evaluating `f(i, j)` for every entry.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    /// Get matrix entry (i, j).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Get the raw matrix data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Whether |A[i][j] - A[j][i]| <= tol for all i, j.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.n).all(|i| {
            (i + 1..self.n).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol)
        })
    }
}

impl LinearOperator for RealDenseOperator {
    fn dim(&self) -> usize {
        self.n
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.n);
        if self.n == 0 {
            return;
        }
        for (yi, row) in y.iter_mut().zip(self.data.chunks_exact(self.n)) {
            *yi = row.iter().zip(x).map(|(a, b)| a * b).sum();
        }
    }
}
