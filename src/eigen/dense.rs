use crate::eigen::{
    check_problem_shape, clamp_count, select_eigenpairs, EigenDecomposition, EigenTarget, EigensolveError,
    SymmetricEigensolver,
};
use crate::sparse::to_dense;
use log::debug;
use nalgebra::{Cholesky, DMatrix, DVector, SymmetricEigen};
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

/// Computes the full spectrum with a dense symmetric eigendecomposition.
///
/// Suitable for problems with up to a few thousand degrees of freedom, such as coarse cages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenseEigensolver {
    /// Convergence tolerance of the implicit QR iteration.
    pub tolerance: f64,
    /// Maximum number of QR iterations. Zero means no limit.
    pub max_iterations: usize,
}

impl Default for DenseEigensolver {
    fn default() -> Self {
        Self {
            tolerance: f64::EPSILON,
            max_iterations: 10_000,
        }
    }
}

impl DenseEigensolver {
    /// Computes all eigenpairs of the dense problem $A v = \lambda M v$.
    pub fn solve_dense(
        &self,
        a: &DMatrix<f64>,
        m: Option<&DMatrix<f64>>,
    ) -> Result<(DVector<f64>, DMatrix<f64>), EigensolveError> {
        dense_generalized_eigen(a, m, self.tolerance, self.max_iterations)
    }
}

/// Solves the full generalized symmetric eigenproblem.
///
/// With $M = L L^T$, the problem reduces to the standard problem for $C = L^{-1} A L^{-T}$,
/// whose eigenvectors $q$ map back to $v = L^{-T} q$.
pub(crate) fn dense_generalized_eigen(
    a: &DMatrix<f64>,
    m: Option<&DMatrix<f64>>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<(DVector<f64>, DMatrix<f64>), EigensolveError> {
    let symmetrize = |x: &DMatrix<f64>| (x + x.transpose()) * 0.5;
    let no_convergence = EigensolveError::NoConvergence {
        iterations: max_iterations,
    };

    match m {
        None => {
            let eigen = SymmetricEigen::try_new(symmetrize(a), tolerance, max_iterations).ok_or(no_convergence)?;
            Ok((eigen.eigenvalues, eigen.eigenvectors))
        }
        Some(m) => {
            let l = Cholesky::new(symmetrize(m))
                .ok_or(EigensolveError::MassNotPositiveDefinite)?
                .unpack();
            let l_inv_a = l
                .solve_lower_triangular(a)
                .ok_or(EigensolveError::MassNotPositiveDefinite)?;
            let c = l
                .solve_lower_triangular(&l_inv_a.transpose())
                .ok_or(EigensolveError::MassNotPositiveDefinite)?;
            let eigen = SymmetricEigen::try_new(symmetrize(&c), tolerance, max_iterations).ok_or(no_convergence)?;
            let eigenvectors = l
                .tr_solve_lower_triangular(&eigen.eigenvectors)
                .ok_or(EigensolveError::MassNotPositiveDefinite)?;
            Ok((eigen.eigenvalues, eigenvectors))
        }
    }
}

impl SymmetricEigensolver for DenseEigensolver {
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        mass: Option<&CsrMatrix<f64>>,
        count: usize,
        target: EigenTarget,
    ) -> Result<EigenDecomposition, EigensolveError> {
        let n = check_problem_shape(matrix, mass)?;
        let count = clamp_count(count, n);
        let a = to_dense(matrix);
        let m = mass.map(to_dense);
        let (eigenvalues, eigenvectors) = self.solve_dense(&a, m.as_ref())?;
        debug!("Dense eigendecomposition of dimension {n}, selecting {count} eigenpairs ({target:?})");
        Ok(select_eigenpairs(&eigenvalues, &eigenvectors, count, target))
    }
}
