//! Starting vectors for power iteration.

use std::fmt;

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// Where the first Ritz vector comes from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StartVector {
    /// A caller-supplied vector. Its length must match the operator.
    Explicit(DVector<f64>),
    /// Independent uniform entries in [-1, 1) from an OS-seeded generator.
    #[default]
    Random,
    /// Same distribution as [`StartVector::Random`], reproducible from a seed.
    Seeded(u64),
}

impl StartVector {
    /// Materialise the starting vector for an operator of dimension `dim`.
    ///
    /// The result is not normalised.
    pub fn resolve(self, dim: usize) -> Result<DVector<f64>> {
        match self {
            StartVector::Explicit(v) => {
                if v.len() != dim {
                    return Err(Error::DimensionMismatch {
                        expected: dim,
                        actual: v.len(),
                    });
                }
                Ok(v)
            }
            StartVector::Random => Ok(uniform_vector(dim, &mut StdRng::from_os_rng())),
            StartVector::Seeded(seed) => Ok(uniform_vector(dim, &mut StdRng::seed_from_u64(seed))),
        }
    }
}

impl fmt::Display for StartVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartVector::Explicit(v) => write!(f, "explicit (length {})", v.len()),
            StartVector::Random => write!(f, "random"),
            StartVector::Seeded(seed) => write!(f, "random (seed {})", seed),
        }
    }
}

impl From<DVector<f64>> for StartVector {
    fn from(v: DVector<f64>) -> Self {
        StartVector::Explicit(v)
    }
}

impl From<Vec<f64>> for StartVector {
    fn from(v: Vec<f64>) -> Self {
        StartVector::Explicit(DVector::from_vec(v))
    }
}

fn uniform_vector<R: Rng>(dim: usize, rng: &mut R) -> DVector<f64> {
    DVector::from_fn(dim, |_, _| rng.random_range(-1.0..1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_vector_is_returned_unchanged() {
        let v = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let resolved = StartVector::Explicit(v.clone()).resolve(3).unwrap();
        assert_eq!(resolved, v);
    }

    #[test]
    fn explicit_length_mismatch() {
        let err = StartVector::from(vec![1.0, 2.0, 3.0]).resolve(5).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 5,
                actual: 3
            }
        ));
    }

    #[test]
    fn random_entries_in_range() {
        let v = StartVector::Random.resolve(64).unwrap();
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|&x| (-1.0..1.0).contains(&x)));
        assert!(v.norm() > 0.0);
    }

    #[test]
    fn seeded_is_reproducible() {
        let a = StartVector::Seeded(42).resolve(16).unwrap();
        let b = StartVector::Seeded(42).resolve(16).unwrap();
        let c = StartVector::Seeded(43).resolve(16).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn default_is_random() {
        assert_eq!(StartVector::default(), StartVector::Random);
    }

    #[test]
    fn display_names() {
        assert_eq!(StartVector::Seeded(7).to_string(), "random (seed 7)");
        assert_eq!(
            StartVector::from(vec![0.0; 4]).to_string(),
            "explicit (length 4)"
        );
    }
}
