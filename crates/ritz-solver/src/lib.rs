//! Matrix-free dominant eigenpair estimation by power iteration.
//!
//! This crate provides:
//! - The [`LinearOperator`] trait: anything with a dimension and a
//!   matrix-vector product
//! - [`PowerMethod`]: a power iteration solver holding a borrowed operator and
//!   the current Ritz pair
//! - [`StartVector`]: explicit, random or seeded starting vectors
//! - [`ShiftedOperator`] for spectral shifts A + sigma * I

pub mod error;
pub mod operator;
pub mod power;
pub mod start;

pub use error::{Error, Result};
pub use operator::{LinearOperator, ShiftedOperator};
pub use power::{PowerMethod, PowerMethodConfig, PowerMethodResult, solve_power_method};
pub use start::StartVector;
