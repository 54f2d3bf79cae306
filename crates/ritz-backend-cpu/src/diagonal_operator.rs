//! Diagonal scaling operator.

use ritz_solver::LinearOperator;

/// Diagonal operator: y_i = d_i * x_i.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalOperator {
    diag: Vec<f64>,
}

impl DiagonalOperator {
    pub fn new(diag: Vec<f64>) -> Self {
        Self { diag }
    }

    pub fn diagonal(&self) -> &[f64] {
        &self.diag
    }
}

impl From<Vec<f64>> for DiagonalOperator {
    fn from(diag: Vec<f64>) -> Self {
        Self::new(diag)
    }
}

impl LinearOperator for DiagonalOperator {
    fn dim(&self) -> usize {
        self.diag.len()
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.diag.len());
        assert_eq!(y.len(), self.diag.len());
        for ((yi, &di), &xi) in y.iter_mut().zip(&self.diag).zip(x) {
            *yi = di * xi;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_each_entry() {
        let op = DiagonalOperator::from(vec![2.0, -1.0, 0.5]);
        assert_eq!(op.dim(), 3);

        let mut y = vec![0.0; 3];
        op.apply(&[1.0, 2.0, 4.0], &mut y);
        assert_eq!(y, vec![2.0, -2.0, 2.0]);
        assert_eq!(op.diagonal(), &[2.0, -1.0, 0.5]);
    }
}
