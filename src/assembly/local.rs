use crate::assembly::Lumping;
use crate::element::FiniteElement;
use itertools::izip;
use log::warn;
use nalgebra::{DMatrix, DVector, Matrix3xX, Point3};

/// Computes the scalar element mass matrix with the given reference quadrature.
pub fn element_mass_matrix<E>(element: &E, density: f64, weights: &[f64], points: &[Point3<f64>]) -> DMatrix<f64>
where
    E: FiniteElement<f64>,
{
    let n = element.num_nodes();
    let mut basis = vec![0.0; n];
    let mut m = DMatrix::zeros(n, n);
    for (w, xi) in izip!(weights, points) {
        let j_det = element.reference_jacobian(xi).determinant().abs();
        element.populate_basis(&mut basis, xi);
        let phi = DVector::from_column_slice(&basis);
        m.ger(density * w * j_det, &phi, &phi, 1.0);
    }
    m
}

/// Computes the scalar element stiffness matrix of the Laplace operator.
///
/// Elements with a singular Jacobian contribute nothing.
pub fn element_stiffness_matrix<E>(element: &E, weights: &[f64], points: &[Point3<f64>]) -> DMatrix<f64>
where
    E: FiniteElement<f64>,
{
    let n = element.num_nodes();
    let mut ref_gradients = Matrix3xX::zeros(n);
    let mut k = DMatrix::zeros(n, n);
    for (w, xi) in izip!(weights, points) {
        let j = element.reference_jacobian(xi);
        let Some(j_inv) = j.try_inverse() else {
            warn!("Skipping element with singular Jacobian in stiffness assembly");
            return DMatrix::zeros(n, n);
        };
        element.populate_basis_gradients(&mut ref_gradients, xi);
        let g = j_inv.transpose() * &ref_gradients;
        k.gemm_tr(w * j.determinant().abs(), &g, &g, 1.0);
    }
    k
}

/// Returns the diagonal of the lumped element mass matrix.
pub fn lump_element_matrix(m: &DMatrix<f64>, lumping: Lumping) -> DVector<f64> {
    match lumping {
        Lumping::RowSum => m.column_sum(),
        Lumping::DiagonalScaling => {
            let total_mass = m.sum();
            let diagonal = m.diagonal();
            let diagonal_mass = diagonal.sum();
            if diagonal_mass == 0.0 {
                diagonal
            } else {
                diagonal * (total_mass / diagonal_mass)
            }
        }
    }
}

/// Replicates a scalar matrix across `solution_dim` components, i.e. computes $M \otimes I$.
pub fn expand_scalar_matrix(m: &DMatrix<f64>, solution_dim: usize) -> DMatrix<f64> {
    if solution_dim == 1 {
        m.clone()
    } else {
        m.kronecker(&DMatrix::identity(solution_dim, solution_dim))
    }
}
