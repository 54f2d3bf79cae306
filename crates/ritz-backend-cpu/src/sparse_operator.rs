//! Compressed sparse row (CSR) operator.
//!
//! Rows are stored contiguously: the entries of row `i` live at
//! `row_ptr[i]..row_ptr[i + 1]` in `col_indices` and `values`. The mat-vec
//! visits each stored entry once, so one application costs O(nnz).
//!
//! With the `parallel` feature, rows are split across the rayon pool once
//! the operator has at least [`PARALLEL_ROW_THRESHOLD`] rows.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use ritz_solver::{Error, LinearOperator, Result};

/// Minimum row count before `apply` goes row-parallel (below this the
/// sequential loop is faster).
pub const PARALLEL_ROW_THRESHOLD: usize = 4096;

/// Square sparse matrix operator in CSR layout.
#[derive(Debug, Clone)]
pub struct CsrOperator {
    n: usize,
    row_ptr: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl CsrOperator {
    /// Build from raw CSR arrays.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperator`] if `row_ptr` does not have `n + 1`
    /// non-decreasing entries ending at `values.len()`, if `col_indices` and
    /// `values` differ in length, or if a column index is out of range.
    pub fn from_csr_parts(
        n: usize,
        row_ptr: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if row_ptr.len() != n + 1 {
            return Err(Error::InvalidOperator(format!(
                "row_ptr has length {}, expected {}",
                row_ptr.len(),
                n + 1
            )));
        }
        if col_indices.len() != values.len() {
            return Err(Error::InvalidOperator(format!(
                "{} column indices for {} values",
                col_indices.len(),
                values.len()
            )));
        }
        if row_ptr[0] != 0 || row_ptr[n] != values.len() {
            return Err(Error::InvalidOperator(format!(
                "row_ptr must span 0..{}, got {}..{}",
                values.len(),
                row_ptr[0],
                row_ptr[n]
            )));
        }
        if let Some(i) = row_ptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(Error::InvalidOperator(format!(
                "row_ptr decreases at row {}",
                i
            )));
        }
        if let Some(&col) = col_indices.iter().find(|&&c| c >= n) {
            return Err(Error::InvalidOperator(format!(
                "column index {} out of range for {}x{} matrix",
                col, n, n
            )));
        }

        Ok(Self {
            n,
            row_ptr,
            col_indices,
            values,
        })
    }

    /// Build from `(row, col, value)` triplets in any order.
    ///
    /// Duplicate positions are summed; explicit zeros are kept.
    pub fn from_triplets(n: usize, triplets: &[(usize, usize, f64)]) -> Result<Self> {
        if let Some(&(row, col, _)) = triplets.iter().find(|&&(r, c, _)| r >= n || c >= n) {
            return Err(Error::InvalidOperator(format!(
                "entry ({}, {}) out of range for {}x{} matrix",
                row, col, n, n
            )));
        }

        let mut sorted = triplets.to_vec();
        sorted.sort_by_key(|&(r, c, _)| (r, c));

        let mut row_ptr = vec![0; n + 1];
        let mut col_indices: Vec<usize> = Vec::with_capacity(sorted.len());
        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, value) in sorted {
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += value;
                }
                continue;
            }
            row_ptr[row + 1] += 1;
            col_indices.push(col);
            values.push(value);
            last = Some((row, col));
        }

        for i in 0..n {
            row_ptr[i + 1] += row_ptr[i];
        }

        log::debug!(
            "CSR operator: {}x{}, {} stored entries from {} triplets",
            n,
            n,
            values.len(),
            triplets.len()
        );

        Self::from_csr_parts(n, row_ptr, col_indices, values)
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get matrix entry (i, j), summing duplicates. Zero if not stored.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_indices[range.clone()]
            .iter()
            .zip(&self.values[range])
            .filter(|&(&c, _)| c == j)
            .map(|(_, &v)| v)
            .sum()
    }

    /// Whether |A[i][j] - A[j][i]| <= tol for every stored entry.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.n).all(|i| {
            let range = self.row_ptr[i]..self.row_ptr[i + 1];
            self.col_indices[range]
                .iter()
                .all(|&j| (self.get(i, j) - self.get(j, i)).abs() <= tol)
        })
    }

    #[inline]
    fn row_dot(&self, row: usize, x: &[f64]) -> f64 {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_indices[range.clone()]
            .iter()
            .zip(&self.values[range])
            .map(|(&c, &v)| v * x[c])
            .sum()
    }
}

impl LinearOperator for CsrOperator {
    fn dim(&self) -> usize {
        self.n
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.n);

        self.apply_rows(x, y);
    }
}

impl CsrOperator {
    #[cfg(feature = "parallel")]
    fn apply_rows(&self, x: &[f64], y: &mut [f64]) {
        if self.n >= PARALLEL_ROW_THRESHOLD && rayon::current_num_threads() > 1 {
            y.par_iter_mut()
                .enumerate()
                .for_each(|(row, yi)| *yi = self.row_dot(row, x));
        } else {
            self.apply_rows_sequential(x, y);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn apply_rows(&self, x: &[f64], y: &mut [f64]) {
        self.apply_rows_sequential(x, y);
    }

    fn apply_rows_sequential(&self, x: &[f64], y: &mut [f64]) {
        for (row, yi) in y.iter_mut().enumerate() {
            *yi = self.row_dot(row, x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiagonal(n: usize) -> CsrOperator {
        let mut triplets = Vec::new();
        for i in 0..n {
            triplets.push((i, i, 2.0));
            if i > 0 {
                triplets.push((i, i - 1, -1.0));
            }
            if i + 1 < n {
                triplets.push((i, i + 1, -1.0));
            }
        }
        CsrOperator::from_triplets(n, &triplets).unwrap()
    }

    #[test]
    fn triplets_build_sorted_rows() {
        let op = CsrOperator::from_triplets(3, &[(2, 0, 5.0), (0, 1, 1.0), (0, 0, 4.0)]).unwrap();
        assert_eq!(op.dim(), 3);
        assert_eq!(op.nnz(), 3);
        assert_eq!(op.row_ptr(), &[0, 2, 2, 3]);
        assert_eq!(op.col_indices(), &[0, 1, 0]);
        assert_eq!(op.values(), &[4.0, 1.0, 5.0]);
    }

    #[test]
    fn duplicate_triplets_are_summed() {
        let op = CsrOperator::from_triplets(2, &[(0, 0, 1.0), (1, 1, 2.0), (0, 0, 0.5)]).unwrap();
        assert_eq!(op.nnz(), 2);
        assert_eq!(op.get(0, 0), 1.5);
        assert_eq!(op.get(0, 1), 0.0);
    }

    #[test]
    fn out_of_range_triplet() {
        let err = CsrOperator::from_triplets(2, &[(0, 2, 1.0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidOperator(_)));
    }

    #[test]
    fn invalid_csr_parts() {
        assert!(CsrOperator::from_csr_parts(2, vec![0, 1], vec![0], vec![1.0]).is_err());
        assert!(CsrOperator::from_csr_parts(2, vec![0, 1, 2], vec![0], vec![1.0, 2.0]).is_err());
        assert!(CsrOperator::from_csr_parts(2, vec![0, 2, 1], vec![0, 1], vec![1.0, 2.0]).is_err());
        assert!(CsrOperator::from_csr_parts(2, vec![0, 1, 2], vec![0, 5], vec![1.0, 2.0]).is_err());
        assert!(CsrOperator::from_csr_parts(2, vec![0, 1, 2], vec![0, 1], vec![1.0, 2.0]).is_ok());
    }

    #[test]
    fn matvec_tridiagonal() {
        let op = tridiagonal(4);
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let mut y = vec![0.0; 4];
        op.apply(&x, &mut y);
        assert_eq!(y, vec![0.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn large_matvec_matches_sequential_rows() {
        let n = PARALLEL_ROW_THRESHOLD + 17;
        let op = tridiagonal(n);
        let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.37).sin()).collect();
        let mut y = vec![0.0; n];
        op.apply(&x, &mut y);

        for (row, &yi) in y.iter().enumerate() {
            assert_eq!(yi, op.row_dot(row, &x));
        }
    }

    #[test]
    fn symmetry_check() {
        assert!(tridiagonal(5).is_symmetric(0.0));
        let asym = CsrOperator::from_triplets(2, &[(0, 1, 1.0)]).unwrap();
        assert!(!asym.is_symmetric(1e-12));
    }

    #[test]
    fn empty_operator() {
        let op = CsrOperator::from_triplets(0, &[]).unwrap();
        assert_eq!(op.dim(), 0);
        let mut y: Vec<f64> = vec![];
        op.apply(&[], &mut y);
    }
}
