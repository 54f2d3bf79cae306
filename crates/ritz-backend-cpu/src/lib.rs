//! CPU operators for ritz-solver.
//!
//! Each type implements [`ritz_solver::LinearOperator`]:
//! - [`RealDenseOperator`]: row-major dense N x N storage
//! - [`CsrOperator`]: compressed sparse rows, row-parallel with the
//!   `parallel` feature
//! - [`DiagonalOperator`]: a diagonal scaling

pub mod dense_operator;
pub mod diagonal_operator;
pub mod sparse_operator;

pub use dense_operator::RealDenseOperator;
pub use diagonal_operator::DiagonalOperator;
pub use sparse_operator::{CsrOperator, PARALLEL_ROW_THRESHOLD};
