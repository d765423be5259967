//! Transfer operators between finite element meshes.
//!
//! Both operators are built once from a regularized Galerkin system
//! $A_{\text{reg}} = A + \lambda U + \mu H$ and then applied to any number of source fields:
//!
//! - [`CholeskyTransferOperator`] solves $A_{\text{reg}} u_T = P u_S$ exactly with a sparse
//!   Cholesky factorization.
//! - [`LowRankTransferOperator`] applies the pseudo-inverse of $A_{\text{reg}}$ restricted to its
//!   eigenvectors closest to zero.
use crate::element::ElementConnectivity;
use crate::error::{check_shape, TransferError};
use crate::galerkin::{assemble_galerkin_system, GalerkinSystem};
use crate::mesh::Mesh;
use crate::regularization::{regularized_system, smoothing_energy};
use crate::sampling::{OutOfDomainPolicy, SamplingOptions};
use log::debug;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

mod cholesky;
mod low_rank;

pub use cholesky::*;
pub use low_rank::*;

/// Settings shared by all transfer operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Number of components of the transferred fields.
    pub solution_dim: usize,
    /// Weight $\lambda$ of the smoothing energy.
    pub smoothing_weight: f64,
    /// Weight $\mu$ of the elastic Hessian.
    pub stiffness_weight: f64,
    /// Number of Laplacian applications in the smoothing energy.
    pub smoothing_power: usize,
    /// Overrides the Galerkin quadrature strength, which otherwise is twice the highest
    /// polynomial order of the source and target meshes.
    pub quadrature_strength: Option<usize>,
    pub out_of_domain: OutOfDomainPolicy,
    pub containment_tolerance: f64,
    pub parallel_point_location: bool,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            solution_dim: 3,
            smoothing_weight: 5.0,
            stiffness_weight: 1.0,
            smoothing_power: 1,
            quadrature_strength: None,
            out_of_domain: OutOfDomainPolicy::NearestElement,
            containment_tolerance: SamplingOptions::default().containment_tolerance,
            parallel_point_location: false,
        }
    }
}

impl TransferSettings {
    pub fn validate(&self) -> Result<(), TransferError> {
        let invalid = |reason: &str| Err(TransferError::InvalidSettings(reason.to_string()));
        if self.solution_dim == 0 {
            return invalid("solution dimension must be positive");
        }
        if self.smoothing_power == 0 {
            return invalid("smoothing power must be at least 1");
        }
        if !(self.smoothing_weight.is_finite() && self.smoothing_weight >= 0.0) {
            return invalid("smoothing weight must be finite and non-negative");
        }
        if !(self.stiffness_weight.is_finite() && self.stiffness_weight >= 0.0) {
            return invalid("stiffness weight must be finite and non-negative");
        }
        if !(self.containment_tolerance >= 0.0) {
            return invalid("containment tolerance must be non-negative");
        }
        Ok(())
    }

    pub fn sampling_options(&self) -> SamplingOptions {
        SamplingOptions {
            out_of_domain: self.out_of_domain,
            containment_tolerance: self.containment_tolerance,
            parallel: self.parallel_point_location,
        }
    }
}

/// A Galerkin system together with its regularized system matrix.
#[derive(Debug, Clone)]
pub struct RegularizedGalerkinSystem {
    pub galerkin: GalerkinSystem,
    /// The smoothing energy $U$ of the target mesh.
    pub smoothing: CsrMatrix<f64>,
    /// $A + \lambda U + \mu H$.
    pub regularized: CsrMatrix<f64>,
}

/// Assembles the Galerkin system and its regularization.
///
/// The elastic Hessian of the target mesh is optional. When given, it must match the number
/// of target degrees of freedom.
pub fn assemble_regularized_system<CD, CS, CT>(
    domain: &Mesh<f64, CD>,
    source: &Mesh<f64, CS>,
    target: &Mesh<f64, CT>,
    hessian: Option<&CsrMatrix<f64>>,
    settings: &TransferSettings,
) -> Result<RegularizedGalerkinSystem, TransferError>
where
    CD: ElementConnectivity<f64>,
    CS: ElementConnectivity<f64> + Sync,
    CT: ElementConnectivity<f64> + Sync,
{
    settings.validate()?;
    if let Some(h) = hessian {
        let target_dofs = settings.solution_dim * target.num_nodes();
        check_shape("elastic Hessian", (target_dofs, target_dofs), (h.nrows(), h.ncols()))?;
    }

    let galerkin = assemble_galerkin_system(domain, source, target, settings)?;
    let smoothing = smoothing_energy(target, settings.solution_dim, settings.smoothing_power)?;
    let regularized = regularized_system(
        &galerkin.a,
        &smoothing,
        hessian,
        settings.smoothing_weight,
        settings.stiffness_weight,
    )?;
    debug!(
        "Regularized system with smoothing weight {} and stiffness weight {}",
        settings.smoothing_weight, settings.stiffness_weight
    );
    Ok(RegularizedGalerkinSystem {
        galerkin,
        smoothing,
        regularized,
    })
}

/// An operator mapping fields on a source mesh to fields on a target mesh.
pub trait TransferOperator {
    fn source_dofs(&self) -> usize;

    fn target_dofs(&self) -> usize;

    /// Transfers a single source field.
    fn apply(&self, field: &DVector<f64>) -> Result<DVector<f64>, TransferError>;

    /// Transfers every column of `fields`.
    fn apply_columns(&self, fields: &DMatrix<f64>) -> Result<DMatrix<f64>, TransferError> {
        check_shape(
            "source fields",
            (self.source_dofs(), fields.ncols()),
            (fields.nrows(), fields.ncols()),
        )?;
        let mut result = DMatrix::zeros(self.target_dofs(), fields.ncols());
        for (j, field) in fields.column_iter().enumerate() {
            result.set_column(j, &self.apply(&field.into_owned())?);
        }
        Ok(result)
    }
}

pub(crate) fn check_source_field(operator: &impl TransferOperator, len: usize) -> Result<(), TransferError> {
    check_shape("source field", (operator.source_dofs(), 1), (len, 1))
}
