//! Cross-mesh Galerkin ($L^2$ projection) systems.
//!
//! For quadrature points $x_q$ with weights $w_q$ on a domain mesh, and shape function matrices
//! $N_S$, $N_T$ sampling the source and target meshes at those points, the Galerkin system is
//!
//! $$
//! A = N_T^T W N_T, \qquad P = N_T^T W N_S, \qquad W = \operatorname{diag}(w) \otimes I_d.
//! $$
//!
//! Solving $A u_T = P u_S$ gives the target field closest to the source field in the $L^2$ norm
//! induced by the domain quadrature.
use crate::element::ElementConnectivity;
use crate::error::TransferError;
use crate::mesh::Mesh;
use crate::quadrature::mesh_quadrature;
use crate::sampling::shape_function_matrix;
use crate::space::SpatiallyIndexed;
use crate::sparse::{diagonal_matrix, kronecker_with_identity};
use crate::transfer::TransferSettings;
use log::debug;
use nalgebra::{DVector, Point3};
use nalgebra_sparse::CsrMatrix;

/// The assembled Galerkin system, together with the intermediate sampling matrices.
#[derive(Debug, Clone)]
pub struct GalerkinSystem {
    /// The target "mass" matrix $A = N_T^T W N_T$.
    pub a: CsrMatrix<f64>,
    /// The cross-projection matrix $P = N_T^T W N_S$.
    pub p: CsrMatrix<f64>,
    /// Quadrature weights replicated across components, $W = \operatorname{diag}(w) \otimes I_d$.
    pub weights: CsrMatrix<f64>,
    /// $N_S$, the source mesh sampled at the quadrature points.
    pub source_sampler: CsrMatrix<f64>,
    /// $N_T$, the target mesh sampled at the quadrature points.
    pub target_sampler: CsrMatrix<f64>,
    pub quadrature_points: Vec<Point3<f64>>,
    pub solution_dim: usize,
}

impl GalerkinSystem {
    pub fn source_dofs(&self) -> usize {
        self.p.ncols()
    }

    pub fn target_dofs(&self) -> usize {
        self.a.nrows()
    }
}

/// The quadrature strength used when the settings do not override it.
pub fn default_quadrature_strength(source_order: usize, target_order: usize) -> usize {
    2 * source_order.max(target_order)
}

/// Assembles the Galerkin system transferring fields from `source` to `target`, integrated
/// with the quadrature of `domain`.
pub fn assemble_galerkin_system<CD, CS, CT>(
    domain: &Mesh<f64, CD>,
    source: &Mesh<f64, CS>,
    target: &Mesh<f64, CT>,
    settings: &TransferSettings,
) -> Result<GalerkinSystem, TransferError>
where
    CD: ElementConnectivity<f64>,
    CS: ElementConnectivity<f64> + Sync,
    CT: ElementConnectivity<f64> + Sync,
{
    settings.validate()?;
    for (mesh_is_empty, role) in [
        (domain.is_empty(), "domain"),
        (source.is_empty(), "source"),
        (target.is_empty(), "target"),
    ] {
        if mesh_is_empty {
            return Err(TransferError::EmptyMesh { role });
        }
    }

    let dims = settings.solution_dim;
    let strength = settings
        .quadrature_strength
        .unwrap_or_else(|| default_quadrature_strength(source.polynomial_order(), target.polynomial_order()));
    let (weights, points) = mesh_quadrature(domain, strength)?;
    debug!(
        "Galerkin quadrature: strength {}, {} points on {} domain elements",
        strength,
        points.len(),
        domain.num_elements()
    );

    let w = kronecker_with_identity(&diagonal_matrix(&DVector::from_vec(weights)), dims);

    let sampling = settings.sampling_options();
    let source_sampler = shape_function_matrix(&SpatiallyIndexed::from_mesh(source), &points, dims, &sampling)?;
    let target_sampler = shape_function_matrix(&SpatiallyIndexed::from_mesh(target), &points, dims, &sampling)?;

    let weighted_target_transpose = &target_sampler.transpose() * &w;
    let a = &weighted_target_transpose * &target_sampler;
    let p = &weighted_target_transpose * &source_sampler;
    debug!(
        "Assembled Galerkin system: A is {}x{} ({} non-zeros), P is {}x{} ({} non-zeros)",
        a.nrows(),
        a.ncols(),
        a.nnz(),
        p.nrows(),
        p.ncols(),
        p.nnz()
    );

    Ok(GalerkinSystem {
        a,
        p,
        weights: w,
        source_sampler,
        target_sampler,
        quadrature_points: points,
        solution_dim: dims,
    })
}
