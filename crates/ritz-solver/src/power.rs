//! Power iteration for the dominant eigenpair of a linear operator.
//!
//! [`PowerMethod`] keeps a unit-norm Ritz vector `x` and its Ritz value
//! `x . Ax` and refines them by repeated application of the operator:
//!
//! ```text
//! x_{k+1} = A x_k / ||A x_k||
//! lambda_{k+1} = x_{k+1} . A x_{k+1}
//! ```
//!
//! Iteration stops once the Ritz residual `||A x - lambda x||` drops below the
//! requested tolerance. The iterate converges to the eigenvector of the
//! eigenvalue of largest magnitude at a rate set by `|lambda_2 / lambda_1|`.
//! Each step costs two operator applications plus O(n) vector work.
//!
//! # Example
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use ritz_solver::{PowerMethod, StartVector};
//!
//! let a = DMatrix::from_row_slice(2, 2, &[3.0, -1.0, -1.0, 3.0]);
//! let start = StartVector::Explicit(DVector::from_vec(vec![1.0, 0.0]));
//! let mut solver = PowerMethod::new(&a, start).unwrap();
//!
//! assert!(solver.compute(100, 1e-8).unwrap());
//! assert!((solver.eigenvalue() - 4.0).abs() < 1e-8);
//! ```

use std::fmt;

use nalgebra::DVector;

use crate::error::{Error, Result};
use crate::operator::LinearOperator;
use crate::start::StartVector;

/// Power method configuration.
#[derive(Debug, Clone)]
pub struct PowerMethodConfig {
    /// Maximum number of refinement steps per run.
    pub max_iterations: usize,
    /// Convergence tolerance on the Ritz residual norm.
    pub tol: f64,
}

impl Default for PowerMethodConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tol: 1e-8,
        }
    }
}

impl PowerMethodConfig {
    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the residual tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
}

/// Snapshot of a power method run.
#[derive(Debug, Clone)]
pub struct PowerMethodResult {
    /// Ritz value (estimate of the dominant eigenvalue).
    pub eigenvalue: f64,
    /// Unit-norm Ritz vector.
    pub eigenvector: DVector<f64>,
    /// Refinement steps performed since construction.
    pub iterations: usize,
    /// Ritz residual norm of the returned pair.
    pub residual: f64,
    /// Whether the residual fell below the tolerance.
    pub converged: bool,
}

impl fmt::Display for PowerMethodResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "power method: {} in {} iterations, eigenvalue = {:.12e}, residual = {:.2e}",
            if self.converged {
                "converged"
            } else {
                "did not converge"
            },
            self.iterations,
            self.eigenvalue,
            self.residual
        )
    }
}

/// Power iteration solver over a borrowed operator.
///
/// The solver never owns or copies the operator; the borrow ties the
/// solver's lifetime to it. After construction and after every call to
/// [`compute`](Self::compute) the Ritz vector has unit norm and the Ritz
/// value equals its Rayleigh quotient.
///
/// Construction performs one implicit power iteration on the normalised
/// start vector. That step establishes the first Ritz pair and is not
/// counted by [`iterations`](Self::iterations).
pub struct PowerMethod<'a, A: LinearOperator + ?Sized> {
    operator: &'a A,
    dim: usize,
    iterations: usize,
    ritz_value: f64,
    ritz_vector: DVector<f64>,
}

impl<'a, A: LinearOperator + ?Sized> PowerMethod<'a, A> {
    /// Create a solver for `operator` from the given starting vector.
    ///
    /// # Errors
    ///
    /// * [`Error::DimensionMismatch`] if an explicit start vector does not
    ///   have length `operator.dim()`.
    /// * [`Error::DegenerateVector`] if the start vector, or its image under
    ///   the operator, is numerically zero.
    /// * [`Error::InvalidOperator`] if the operator is not square.
    pub fn new(operator: &'a A, start: StartVector) -> Result<Self> {
        let (nrows, ncols) = operator.shape();
        if nrows != ncols {
            return Err(Error::InvalidOperator(format!(
                "operator must be square, got {}x{}",
                nrows, ncols
            )));
        }
        let dim = operator.dim();
        log::debug!("power method: dim = {}, start = {}", dim, start);

        let x0 = normalize(start.resolve(dim)?)?;
        let mut solver = Self {
            operator,
            dim,
            iterations: 0,
            ritz_value: 0.0,
            ritz_vector: x0,
        };

        let x1 = solver.power_iteration()?;
        let (value, _) = solver.ritz_pair(&x1);
        solver.ritz_vector = x1;
        solver.ritz_value = value;

        Ok(solver)
    }

    /// Apply one power iteration to `x`: return `A x / ||A x||`.
    ///
    /// Pure in `x` and the operator; the solver state is untouched.
    pub fn power_iteration_from(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        if x.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: x.len(),
            });
        }
        normalize(self.apply(x))
    }

    /// Apply one power iteration to the current Ritz vector.
    pub fn power_iteration(&self) -> Result<DVector<f64>> {
        self.power_iteration_from(&self.ritz_vector)
    }

    /// Whether the Ritz residual of the current vector is below `tol`.
    ///
    /// Evaluates the residual afresh and does not advance the iteration.
    pub fn converged(&self, tol: f64) -> bool {
        self.residual() < tol
    }

    /// Ritz residual `||A x - (x . Ax) x||` of the current Ritz vector.
    pub fn residual(&self) -> f64 {
        self.ritz_pair(&self.ritz_vector).1
    }

    /// Run up to `max_iterations` power iterations, stopping early once the
    /// Ritz residual drops below `tol`.
    ///
    /// Returns `Ok(true)` on convergence and `Ok(false)` when the budget is
    /// exhausted. With `max_iterations == 0` this is [`converged`] and
    /// nothing changes. A [`Error::DegenerateVector`] aborts the call and
    /// keeps the last Ritz pair.
    ///
    /// [`converged`]: Self::converged
    pub fn compute(&mut self, max_iterations: usize, tol: f64) -> Result<bool> {
        self.compute_inner(max_iterations, tol).map(|(converged, _)| converged)
    }

    /// [`compute`](Self::compute), also returning the residual of the final
    /// Ritz pair.
    fn compute_inner(&mut self, max_iterations: usize, tol: f64) -> Result<(bool, f64)> {
        if max_iterations == 0 {
            let residual = self.residual();
            return Ok((residual < tol, residual));
        }

        let start_iterations = self.iterations;
        let mut residual = f64::INFINITY;
        let mut is_converged = false;

        for _ in 0..max_iterations {
            let x = self.power_iteration()?;
            let (value, res) = self.ritz_pair(&x);

            self.ritz_vector = x;
            self.ritz_value = value;
            self.iterations += 1;
            residual = res;

            log::trace!(
                "power iteration {}: ritz value = {:.15e}, residual = {:.3e}",
                self.iterations,
                value,
                res
            );

            if res < tol {
                is_converged = true;
                break;
            }
        }

        log::debug!(
            "power method: {} after {} iterations (total {}), residual = {:.3e}",
            if is_converged {
                "converged"
            } else {
                "not converged"
            },
            self.iterations - start_iterations,
            self.iterations,
            residual
        );

        Ok((is_converged, residual))
    }

    /// Run [`compute`](Self::compute) with the settings in `config`.
    pub fn run(&mut self, config: &PowerMethodConfig) -> Result<PowerMethodResult> {
        let (converged, residual) = self.compute_inner(config.max_iterations, config.tol)?;
        if !converged {
            log::warn!(
                "power method did not converge in {} iterations (residual {:.3e}, tol {:.3e})",
                config.max_iterations,
                residual,
                config.tol
            );
        }

        Ok(PowerMethodResult {
            eigenvalue: self.ritz_value,
            eigenvector: self.ritz_vector.clone(),
            iterations: self.iterations,
            residual,
            converged,
        })
    }

    /// Current Ritz value.
    pub fn eigenvalue(&self) -> f64 {
        self.ritz_value
    }

    /// Current unit-norm Ritz vector.
    pub fn eigenvector(&self) -> &DVector<f64> {
        &self.ritz_vector
    }

    /// Refinement steps performed since construction.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn operator(&self) -> &'a A {
        self.operator
    }

    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut y = DVector::zeros(self.dim);
        self.operator.apply(x.as_slice(), y.as_mut_slice());
        y
    }

    /// Rayleigh quotient and Ritz residual of a unit vector, sharing one
    /// operator application.
    fn ritz_pair(&self, x: &DVector<f64>) -> (f64, f64) {
        let ax = self.apply(x);
        let value = x.dot(&ax);
        let residual = ax
            .iter()
            .zip(x.iter())
            .map(|(&axi, &xi)| {
                let d = axi - value * xi;
                d * d
            })
            .sum::<f64>()
            .sqrt();
        (value, residual)
    }
}

/// Construct a [`PowerMethod`] and run it to convergence in one call.
pub fn solve_power_method<A: LinearOperator + ?Sized>(
    operator: &A,
    start: StartVector,
    config: &PowerMethodConfig,
) -> Result<PowerMethodResult> {
    PowerMethod::new(operator, start)?.run(config)
}

/// Norm threshold below which a vector is treated as zero.
fn degenerate_threshold(dim: usize) -> f64 {
    f64::EPSILON * dim.max(1) as f64
}

fn normalize(mut v: DVector<f64>) -> Result<DVector<f64>> {
    let norm = v.norm();
    let threshold = degenerate_threshold(v.len());
    if norm.is_nan() || norm < threshold {
        return Err(Error::DegenerateVector { norm, threshold });
    }
    v /= norm;
    Ok(v)
}
