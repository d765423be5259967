//! Assembly of global mass and stiffness matrices.
//!
//! All global matrices use the interleaved layout: degree of freedom `s * node + d` holds
//! component `d` of node `node` for a field with solution dimension `s`.
use crate::element::ElementConnectivity;
use crate::mesh::Mesh;
use crate::quadrature::{tetrahedron, QuadratureError};
use log::debug;
use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

mod global;
mod local;

pub use global::*;
pub use local::*;

/// How a consistent mass matrix is turned into a diagonal one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lumping {
    /// Each diagonal entry is the sum of its row.
    ///
    /// Produces non-positive entries for the vertex nodes of quadratic elements.
    RowSum,
    /// Scales the diagonal of each element matrix so that it preserves the element mass
    /// (HRZ lumping). Always positive for positive densities.
    DiagonalScaling,
}

impl Default for Lumping {
    fn default() -> Self {
        Self::RowSum
    }
}

fn mass_quadrature_strength<C: crate::connectivity::Connectivity>(mesh: &Mesh<f64, C>) -> usize {
    2 * mesh.polynomial_order()
}

/// Assembles the consistent mass matrix $M_{IJ} = \int \rho \varphi_I \varphi_J \, dx$,
/// replicated across `solution_dim` components.
pub fn assemble_mass_matrix<C>(
    mesh: &Mesh<f64, C>,
    density: f64,
    solution_dim: usize,
) -> Result<CsrMatrix<f64>, QuadratureError>
where
    C: ElementConnectivity<f64>,
{
    let (weights, points) = tetrahedron(mass_quadrature_strength(mesh))?;
    let element_matrices = mesh
        .elements()
        .zip(mesh.connectivity())
        .map(|(element, conn)| {
            let m = element_mass_matrix(&element, density, &weights, &points);
            (conn.vertex_indices(), expand_scalar_matrix(&m, solution_dim))
        });
    let mass = assemble_element_matrices(mesh.num_nodes(), solution_dim, element_matrices);
    debug!("Assembled mass matrix with {} non-zeros", mass.nnz());
    Ok(mass)
}

/// Assembles a diagonal (lumped) mass matrix.
pub fn assemble_lumped_mass_matrix<C>(
    mesh: &Mesh<f64, C>,
    density: f64,
    solution_dim: usize,
    lumping: Lumping,
) -> Result<CsrMatrix<f64>, QuadratureError>
where
    C: ElementConnectivity<f64>,
{
    let (weights, points) = tetrahedron(mass_quadrature_strength(mesh))?;
    let element_matrices = mesh
        .elements()
        .zip(mesh.connectivity())
        .map(|(element, conn)| {
            let m = element_mass_matrix(&element, density, &weights, &points);
            let lumped = DMatrix::from_diagonal(&lump_element_matrix(&m, lumping));
            (conn.vertex_indices(), expand_scalar_matrix(&lumped, solution_dim))
        });
    Ok(assemble_element_matrices(mesh.num_nodes(), solution_dim, element_matrices))
}

/// Assembles the positive semidefinite stiffness matrix $K_{IJ} = \int \nabla \varphi_I \cdot \nabla \varphi_J \, dx$
/// of the Laplace operator, replicated across `solution_dim` components.
pub fn assemble_stiffness_matrix<C>(mesh: &Mesh<f64, C>, solution_dim: usize) -> Result<CsrMatrix<f64>, QuadratureError>
where
    C: ElementConnectivity<f64>,
{
    let strength = 2 * mesh.polynomial_order().saturating_sub(1);
    let (weights, points) = tetrahedron(strength)?;
    let element_matrices = mesh
        .elements()
        .zip(mesh.connectivity())
        .map(|(element, conn)| {
            let k = element_stiffness_matrix(&element, &weights, &points);
            (conn.vertex_indices(), expand_scalar_matrix(&k, solution_dim))
        });
    Ok(assemble_element_matrices(mesh.num_nodes(), solution_dim, element_matrices))
}

/// Assembles the discrete Laplacian $L = -K$, which is negative semidefinite.
pub fn assemble_laplacian_matrix<C>(mesh: &Mesh<f64, C>, solution_dim: usize) -> Result<CsrMatrix<f64>, QuadratureError>
where
    C: ElementConnectivity<f64>,
{
    Ok(assemble_stiffness_matrix(mesh, solution_dim)? * -1.0)
}
