use crate::eigen::{EigenTarget, SymmetricEigensolver};
use crate::error::{check_shape, TransferError};
use crate::sparse::add_scaled_identity;
use crate::transfer::{check_source_field, RegularizedGalerkinSystem, TransferOperator};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CscMatrix, CsrMatrix};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CholeskySettings {
    /// Added to the magnitude of a non-positive smallest eigenvalue when shifting the system.
    pub shift_tolerance: f64,
}

impl Default for CholeskySettings {
    fn default() -> Self {
        Self { shift_tolerance: 1e-10 }
    }
}

/// Transfers fields by solving the regularized Galerkin system with a sparse Cholesky
/// factorization, computed once at construction.
///
/// If the regularized system is not positive definite, it is shifted by
/// $\tau = |\lambda_{\min}| + \epsilon$ along the diagonal before factoring.
pub struct CholeskyTransferOperator {
    p: CsrMatrix<f64>,
    factorization: CscCholesky<f64>,
    shift: f64,
}

impl std::fmt::Debug for CholeskyTransferOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CholeskyTransferOperator")
            .field("source_dofs", &self.p.ncols())
            .field("target_dofs", &self.p.nrows())
            .field("shift", &self.shift)
            .finish()
    }
}

impl CholeskyTransferOperator {
    pub fn new(
        system: &RegularizedGalerkinSystem,
        settings: &CholeskySettings,
        eigensolver: &dyn SymmetricEigensolver,
    ) -> Result<Self, TransferError> {
        let a_reg = &system.regularized;
        let n = a_reg.nrows();
        if n == 0 {
            return Err(TransferError::EmptyMesh { role: "target" });
        }

        let smallest = eigensolver.solve(a_reg, None, 1, EigenTarget::SmallestAlgebraic)?;
        let lambda_min = smallest.eigenvalues[0];
        let shift = if lambda_min <= 0.0 {
            lambda_min.abs() + settings.shift_tolerance
        } else {
            0.0
        };
        if shift > 0.0 {
            info!("Regularized system has smallest eigenvalue {lambda_min:e}, shifting diagonal by {shift:e}");
        } else {
            debug!("Regularized system is positive definite (smallest eigenvalue {lambda_min:e})");
        }

        let shifted = add_scaled_identity(a_reg, shift);
        let factorization = CscCholesky::factor(&CscMatrix::from(&shifted))?;
        Ok(Self {
            p: system.galerkin.p.clone(),
            factorization,
            shift,
        })
    }

    /// The diagonal shift applied before factoring.
    pub fn shift(&self) -> f64 {
        self.shift
    }
}

impl TransferOperator for CholeskyTransferOperator {
    fn source_dofs(&self) -> usize {
        self.p.ncols()
    }

    fn target_dofs(&self) -> usize {
        self.p.nrows()
    }

    fn apply(&self, field: &DVector<f64>) -> Result<DVector<f64>, TransferError> {
        check_source_field(self, field.len())?;
        let rhs = &self.p * field;
        let solution = self.factorization.solve(&rhs);
        Ok(solution.column(0).into_owned())
    }

    fn apply_columns(&self, fields: &DMatrix<f64>) -> Result<DMatrix<f64>, TransferError> {
        check_shape(
            "source fields",
            (self.source_dofs(), fields.ncols()),
            (fields.nrows(), fields.ncols()),
        )?;
        let rhs = &self.p * fields;
        Ok(self.factorization.solve(&rhs))
    }
}
