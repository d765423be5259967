use crate::eigen::dense::{dense_generalized_eigen, DenseEigensolver};
use crate::eigen::{
    check_problem_shape, clamp_count, select_eigenpairs, EigenDecomposition, EigenTarget, EigensolveError,
    SymmetricEigensolver,
};
use crate::sparse::{add_scaled_identity, to_dense};
use log::debug;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CscMatrix, CsrMatrix};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubspaceIterationSettings {
    pub max_iterations: usize,
    /// Relative residual tolerance for accepting an eigenpair.
    pub tolerance: f64,
    /// Number of additional subspace vectors beyond the requested count.
    pub oversampling: usize,
}

impl Default for SubspaceIterationSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
            oversampling: 8,
        }
    }
}

/// Block inverse iteration with the shifted operator $(A - \sigma M)^{-1} M$ and
/// Rayleigh-Ritz projection.
///
/// The shifted matrix is factored once with a sparse Cholesky factorization. When the shift does
/// not lie below the spectrum the shifted matrix is indefinite, and the eigenpairs are taken from
/// a dense decomposition of the whole problem instead. For the extremal targets of standard
/// problems a shift below the Gershgorin bound of the spectrum is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftInvertSubspaceIteration {
    pub settings: SubspaceIterationSettings,
}

impl ShiftInvertSubspaceIteration {
    pub fn with_settings(settings: SubspaceIterationSettings) -> Self {
        Self { settings }
    }

    fn solve_near_shift(
        &self,
        matrix: &CsrMatrix<f64>,
        mass: Option<&CsrMatrix<f64>>,
        count: usize,
        shift: f64,
    ) -> Result<EigenDecomposition, EigensolveError> {
        let n = matrix.nrows();
        let shifted = match mass {
            Some(mass) => matrix - &(mass * shift),
            None => add_scaled_identity(matrix, -shift),
        };
        let factorization = match CscCholesky::factor(&CscMatrix::from(&shifted)) {
            Ok(factorization) => factorization,
            Err(_) => {
                debug!("Shifted matrix is indefinite for shift {shift:e}, using a dense eigendecomposition");
                let dense = DenseEigensolver::default();
                let (values, vectors) = dense.solve_dense(&to_dense(matrix), mass.map(to_dense).as_ref())?;
                return Ok(select_eigenpairs(&values, &vectors, count, EigenTarget::NearShift(shift)));
            }
        };

        let apply_mass = |x: &DMatrix<f64>| match mass {
            Some(mass) => mass * x,
            None => x.clone(),
        };

        // Residuals of eigenpairs with eigenvalues near zero are measured against the matrix norm
        let matrix_norm = infinity_norm(matrix);
        let block_size = usize::min(n, count + self.settings.oversampling.max(count));
        let mut x = initial_block(n, block_size);
        let mut ritz_values = DVector::zeros(block_size);

        for iteration in 1..=self.settings.max_iterations {
            let y = factorization.solve(&apply_mass(&x));
            let q = y.qr().q();

            // Rayleigh-Ritz projection onto span(Y)
            let a_reduced = q.transpose() * (matrix * &q);
            let m_reduced = q.transpose() * apply_mass(&q);
            let (values, vectors) = dense_generalized_eigen(&a_reduced, Some(&m_reduced), f64::EPSILON, 0)?;
            let ritz = select_eigenpairs(&values, &vectors, block_size, EigenTarget::NearShift(shift));
            x = &q * &ritz.eigenvectors;
            ritz_values = ritz.eigenvalues;

            let ax = matrix * &x;
            let mx = apply_mass(&x);
            let converged = (0..count).all(|j| {
                let theta = ritz_values[j];
                let residual = (ax.column(j) - mx.column(j) * theta).norm();
                let scale = matrix_norm * x.column(j).norm() + theta.abs() * mx.column(j).norm();
                residual <= self.settings.tolerance * scale.max(f64::MIN_POSITIVE)
            });
            if converged {
                debug!("Subspace iteration converged after {iteration} iterations (shift {shift:e})");
                let eigenvectors = x.columns(0, count).into_owned();
                let eigenvalues = ritz_values.rows(0, count).into_owned();
                return Ok(EigenDecomposition {
                    eigenvalues,
                    eigenvectors,
                });
            }
        }

        debug!("Subspace iteration stopped with Ritz values {:?}", ritz_values.as_slice());
        Err(EigensolveError::NoConvergence {
            iterations: self.settings.max_iterations,
        })
    }
}

/// A deterministic, well-mixed starting block.
fn initial_block(n: usize, block_size: usize) -> DMatrix<f64> {
    const GOLDEN: f64 = 0.618_033_988_749_895;
    DMatrix::from_fn(n, block_size, |i, j| {
        let t = ((i + 1) as f64 * GOLDEN + (j + 1) as f64 * GOLDEN * GOLDEN * (i + 1) as f64).fract();
        t - 0.5
    })
}

fn infinity_norm(matrix: &CsrMatrix<f64>) -> f64 {
    matrix
        .row_iter()
        .map(|row| row.values().iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// A lower bound on the eigenvalues of a symmetric matrix by Gershgorin's circle theorem.
fn gershgorin_lower_bound(matrix: &CsrMatrix<f64>) -> f64 {
    matrix
        .row_iter()
        .enumerate()
        .map(|(i, row)| {
            let (diagonal, off_diagonal) = row
                .col_indices()
                .iter()
                .zip(row.values())
                .fold((0.0, 0.0), |(d, r), (&j, &v)| if i == j { (d + v, r) } else { (d, r + v.abs()) });
            diagonal - off_diagonal
        })
        .fold(f64::INFINITY, f64::min)
}

impl SymmetricEigensolver for ShiftInvertSubspaceIteration {
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        mass: Option<&CsrMatrix<f64>>,
        count: usize,
        target: EigenTarget,
    ) -> Result<EigenDecomposition, EigensolveError> {
        let n = check_problem_shape(matrix, mass)?;
        let count = clamp_count(count, n);
        if count == 0 {
            return Ok(select_eigenpairs(&DVector::zeros(0), &DMatrix::zeros(n, 0), 0, target));
        }

        match (target, mass) {
            (EigenTarget::NearShift(shift), _) => self.solve_near_shift(matrix, mass, count, shift),
            (EigenTarget::SmallestAlgebraic, None) => {
                let bound = gershgorin_lower_bound(matrix);
                let shift = bound - 1e-3 * bound.abs().max(1.0);
                self.solve_near_shift(matrix, None, count, shift)
            }
            (EigenTarget::LargestAlgebraic, None) => {
                let negated = matrix * -1.0;
                let bound = gershgorin_lower_bound(&negated);
                let shift = bound - 1e-3 * bound.abs().max(1.0);
                let smallest = self.solve_near_shift(&negated, None, count, shift)?;
                Ok(EigenDecomposition {
                    eigenvalues: -smallest.eigenvalues,
                    eigenvectors: smallest.eigenvectors,
                })
            }
            (target, Some(_)) => Err(EigensolveError::UnsupportedTarget(target)),
        }
    }
}
