use crate::eigen::EigensolveError;
use crate::quadrature::QuadratureError;
use nalgebra_sparse::factorization::CholeskyError;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Errors that can occur while constructing or applying a transfer operator.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferError {
    /// A matrix or vector does not have the dimensions its role requires.
    InputShapeMismatch {
        context: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A query point is further away from the mesh than the containment tolerance.
    PointOutsideMesh { point_index: usize, distance: f64 },
    /// A mesh without elements (or without vertices) was supplied.
    EmptyMesh { role: &'static str },
    Quadrature(QuadratureError),
    InvalidSettings(String),
    /// The regularized system could not be factored.
    Factorization(CholeskyError),
    Eigensolve(EigensolveError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputShapeMismatch {
                context,
                expected,
                actual,
            } => write!(
                f,
                "shape mismatch for {context}: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::PointOutsideMesh { point_index, distance } => write!(
                f,
                "point {point_index} lies outside the mesh (distance {distance:e} to the closest element)"
            ),
            Self::EmptyMesh { role } => write!(f, "the {role} mesh is empty"),
            Self::Quadrature(_) => write!(f, "quadrature rule unavailable"),
            Self::InvalidSettings(reason) => write!(f, "invalid settings: {reason}"),
            Self::Factorization(_) => write!(f, "failed to factor the regularized Galerkin system"),
            Self::Eigensolve(_) => write!(f, "eigenvalue computation failed"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Quadrature(err) => Some(err),
            Self::Factorization(err) => Some(err),
            Self::Eigensolve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QuadratureError> for TransferError {
    fn from(err: QuadratureError) -> Self {
        Self::Quadrature(err)
    }
}

impl From<CholeskyError> for TransferError {
    fn from(err: CholeskyError) -> Self {
        Self::Factorization(err)
    }
}

impl From<EigensolveError> for TransferError {
    fn from(err: EigensolveError) -> Self {
        Self::Eigensolve(err)
    }
}

/// Checks that a matrix has the expected shape.
pub(crate) fn check_shape(
    context: &'static str,
    expected: (usize, usize),
    actual: (usize, usize),
) -> Result<(), TransferError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransferError::InputShapeMismatch {
            context,
            expected,
            actual,
        })
    }
}
