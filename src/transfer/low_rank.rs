use crate::eigen::{EigenTarget, SymmetricEigensolver};
use crate::error::TransferError;
use crate::transfer::{check_source_field, RegularizedGalerkinSystem, TransferOperator};
use log::debug;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowRankSettings {
    /// Number of eigenpairs to compute.
    pub modes: usize,
    /// Eigenpairs are computed closest to this shift.
    pub shift: f64,
    /// Eigenpairs with eigenvalues at or below this threshold are discarded.
    pub threshold: f64,
}

impl Default for LowRankSettings {
    fn default() -> Self {
        Self {
            modes: 30,
            shift: 1e-5,
            threshold: 1e-5,
        }
    }
}

/// Transfers fields with a truncated eigendecomposition of the regularized Galerkin system,
/// $u_T = V \Lambda^{-1} V^T P u_S$.
///
/// If no eigenpair survives the threshold, the operator maps every field to zero.
#[derive(Debug, Clone)]
pub struct LowRankTransferOperator {
    p: CsrMatrix<f64>,
    modes: DMatrix<f64>,
    inverse_eigenvalues: DVector<f64>,
}

impl LowRankTransferOperator {
    pub fn new(
        system: &RegularizedGalerkinSystem,
        settings: &LowRankSettings,
        eigensolver: &dyn SymmetricEigensolver,
    ) -> Result<Self, TransferError> {
        let decomposition = eigensolver.solve(
            &system.regularized,
            None,
            settings.modes,
            EigenTarget::NearShift(settings.shift),
        )?;

        let kept: Vec<usize> = decomposition
            .eigenvalues
            .iter()
            .enumerate()
            .filter(|(_, lambda)| **lambda > settings.threshold)
            .map(|(i, _)| i)
            .collect();
        debug!(
            "Low-rank transfer keeps {} of {} computed eigenpairs (threshold {:e})",
            kept.len(),
            decomposition.len(),
            settings.threshold
        );

        let modes = decomposition.eigenvectors.select_columns(&kept);
        let inverse_eigenvalues = DVector::from_iterator(
            kept.len(),
            kept.iter().map(|&i| 1.0 / decomposition.eigenvalues[i]),
        );
        Ok(Self {
            p: system.galerkin.p.clone(),
            modes,
            inverse_eigenvalues,
        })
    }

    /// The number of eigenpairs used by the operator.
    pub fn rank(&self) -> usize {
        self.inverse_eigenvalues.len()
    }

    pub fn eigenvalues(&self) -> DVector<f64> {
        self.inverse_eigenvalues.map(|inv| 1.0 / inv)
    }
}

impl TransferOperator for LowRankTransferOperator {
    fn source_dofs(&self) -> usize {
        self.p.ncols()
    }

    fn target_dofs(&self) -> usize {
        self.p.nrows()
    }

    fn apply(&self, field: &DVector<f64>) -> Result<DVector<f64>, TransferError> {
        check_source_field(self, field.len())?;
        if self.rank() == 0 {
            return Ok(DVector::zeros(self.target_dofs()));
        }
        let rhs = &self.p * field;
        let coefficients = (self.modes.tr_mul(&rhs)).component_mul(&self.inverse_eigenvalues);
        Ok(&self.modes * coefficients)
    }
}
