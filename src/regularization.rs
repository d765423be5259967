//! Regularization energies that make the Galerkin system well-posed.
use crate::assembly::{assemble_lumped_mass_matrix, assemble_stiffness_matrix, Lumping};
use crate::element::ElementConnectivity;
use crate::error::{check_shape, TransferError};
use crate::mesh::Mesh;
use crate::sparse::{diagonal_matrix, diagonal_of};
use log::debug;
use nalgebra_sparse::CsrMatrix;

/// Assembles the iterated Laplacian smoothing energy of the mesh.
///
/// With the positive semidefinite stiffness matrix $K = -L$ and the lumped mass matrix
/// $M$, this is $U = K (M^{-1} K)^{p - 1}$ for `power` $p \geq 1$. Higher powers penalize
/// high-frequency content more strongly. All terms are replicated across `solution_dim`
/// components.
pub fn smoothing_energy<C>(mesh: &Mesh<f64, C>, solution_dim: usize, power: usize) -> Result<CsrMatrix<f64>, TransferError>
where
    C: ElementConnectivity<f64>,
{
    if power == 0 {
        return Err(TransferError::InvalidSettings(
            "smoothing power must be at least 1".to_string(),
        ));
    }
    if mesh.is_empty() {
        return Err(TransferError::EmptyMesh { role: "target" });
    }

    let k = assemble_stiffness_matrix(mesh, solution_dim)?;
    if power == 1 {
        return Ok(k);
    }

    // HRZ lumping keeps the diagonal positive for quadratic elements as well
    let lumped_mass = assemble_lumped_mass_matrix(mesh, 1.0, solution_dim, Lumping::DiagonalScaling)?;
    let inverse_mass = diagonal_matrix(&diagonal_of(&lumped_mass).map(|m| if m > 0.0 { 1.0 / m } else { 0.0 }));
    let mut u = k.clone();
    for _ in 1..power {
        u = &(&u * &inverse_mass) * &k;
    }
    debug!("Assembled smoothing energy of power {} with {} non-zeros", power, u.nnz());
    Ok(u)
}

/// Combines the Galerkin matrix with the regularization energies,
/// $A_{\text{reg}} = A + \lambda U + \mu H$.
///
/// Terms with zero weight are skipped. The Hessian is optional; when present it must have
/// the same shape as `a`.
pub fn regularized_system(
    a: &CsrMatrix<f64>,
    smoothing: &CsrMatrix<f64>,
    hessian: Option<&CsrMatrix<f64>>,
    smoothing_weight: f64,
    stiffness_weight: f64,
) -> Result<CsrMatrix<f64>, TransferError> {
    let shape = (a.nrows(), a.ncols());
    check_shape("Galerkin matrix (must be square)", (a.nrows(), a.nrows()), shape)?;
    check_shape("smoothing energy", shape, (smoothing.nrows(), smoothing.ncols()))?;
    if let Some(h) = hessian {
        check_shape("elastic Hessian", shape, (h.nrows(), h.ncols()))?;
    }

    let mut regularized = a.clone();
    if smoothing_weight != 0.0 {
        regularized = &regularized + &(smoothing * smoothing_weight);
    }
    if let Some(h) = hessian.filter(|_| stiffness_weight != 0.0) {
        regularized = &regularized + &(h * stiffness_weight);
    }
    Ok(regularized)
}
