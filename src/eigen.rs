//! Symmetric (generalized) eigensolvers.
//!
//! Solvers compute a few eigenpairs of $A v = \lambda M v$ for symmetric $A$ and symmetric
//! positive definite $M$ (the identity when no mass matrix is given). Eigenvectors are
//! $M$-orthonormal.
use log::warn;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

mod dense;
mod subspace;

pub use dense::*;
pub use subspace::*;

/// Which part of the spectrum to compute.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum EigenTarget {
    /// Smallest eigenvalues, in ascending order.
    SmallestAlgebraic,
    /// Largest eigenvalues, in descending order.
    LargestAlgebraic,
    /// Eigenvalues closest to the shift, in order of increasing distance.
    NearShift(f64),
}

/// Eigenvalues and the corresponding eigenvectors (one per column).
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition {
    pub eigenvalues: DVector<f64>,
    pub eigenvectors: DMatrix<f64>,
}

impl EigenDecomposition {
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EigensolveError {
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    MassNotPositiveDefinite,
    UnsupportedTarget(EigenTarget),
    NoConvergence { iterations: usize },
}

impl Display for EigensolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "expected a {}x{} matrix, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::MassNotPositiveDefinite => write!(f, "mass matrix is not positive definite"),
            Self::UnsupportedTarget(target) => write!(f, "eigenvalue target {target:?} is not supported by this solver"),
            Self::NoConvergence { iterations } => {
                write!(f, "eigensolver did not converge after {iterations} iterations")
            }
        }
    }
}

impl Error for EigensolveError {}

pub trait SymmetricEigensolver {
    /// Computes `count` eigenpairs of the given target.
    ///
    /// Requests for more eigenpairs than the matrix dimension are clamped.
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        mass: Option<&CsrMatrix<f64>>,
        count: usize,
        target: EigenTarget,
    ) -> Result<EigenDecomposition, EigensolveError>;
}

impl<S: SymmetricEigensolver + ?Sized> SymmetricEigensolver for &S {
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        mass: Option<&CsrMatrix<f64>>,
        count: usize,
        target: EigenTarget,
    ) -> Result<EigenDecomposition, EigensolveError> {
        (**self).solve(matrix, mass, count, target)
    }
}

/// Computes the `count` smallest (ascending) and largest (descending) eigenvalues of a
/// symmetric matrix.
pub fn min_max_eigenvalues(
    matrix: &CsrMatrix<f64>,
    count: usize,
    solver: &dyn SymmetricEigensolver,
) -> Result<(DVector<f64>, DVector<f64>), EigensolveError> {
    let smallest = solver.solve(matrix, None, count, EigenTarget::SmallestAlgebraic)?;
    let largest = solver.solve(matrix, None, count, EigenTarget::LargestAlgebraic)?;
    Ok((smallest.eigenvalues, largest.eigenvalues))
}

/// Checks that the matrix (and mass) are square with matching dimensions.
pub(crate) fn check_problem_shape(
    matrix: &CsrMatrix<f64>,
    mass: Option<&CsrMatrix<f64>>,
) -> Result<usize, EigensolveError> {
    let n = matrix.nrows();
    if matrix.ncols() != n {
        return Err(EigensolveError::ShapeMismatch {
            expected: (n, n),
            actual: (matrix.nrows(), matrix.ncols()),
        });
    }
    if let Some(mass) = mass {
        if mass.nrows() != n || mass.ncols() != n {
            return Err(EigensolveError::ShapeMismatch {
                expected: (n, n),
                actual: (mass.nrows(), mass.ncols()),
            });
        }
    }
    Ok(n)
}

pub(crate) fn clamp_count(count: usize, n: usize) -> usize {
    if count > n {
        warn!("Requested {count} eigenpairs, but the problem only has dimension {n}");
        n
    } else {
        count
    }
}

/// Picks the `count` eigenpairs matching the target, ordered as documented in [`EigenTarget`].
pub(crate) fn select_eigenpairs(
    eigenvalues: &DVector<f64>,
    eigenvectors: &DMatrix<f64>,
    count: usize,
    target: EigenTarget,
) -> EigenDecomposition {
    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    let key = |i: usize| {
        let lambda = eigenvalues[i];
        OrderedFloat(match target {
            EigenTarget::SmallestAlgebraic => lambda,
            EigenTarget::LargestAlgebraic => -lambda,
            EigenTarget::NearShift(sigma) => (lambda - sigma).abs(),
        })
    };
    order.sort_by_key(|&i| key(i));
    order.truncate(count);

    EigenDecomposition {
        eigenvalues: DVector::from_iterator(order.len(), order.iter().map(|&i| eigenvalues[i])),
        eigenvectors: eigenvectors.select_columns(&order),
    }
}
