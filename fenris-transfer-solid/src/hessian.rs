//! Assembly of the Hessian of the elastic energy $\Psi(u) = \int_\Omega \psi(\vec F) \, dX$ with
//! $\vec F = \vec I + \nabla u$.
use crate::HyperelasticMaterial;
use fenris_transfer::assembly::assemble_element_matrices;
use fenris_transfer::connectivity::Connectivity;
use fenris_transfer::element::{ElementConnectivity, FiniteElement};
use fenris_transfer::mesh::Mesh;
use fenris_transfer::nalgebra::{DMatrix, DVector, Matrix3, Matrix3xX, Point3, Vector3};
use fenris_transfer::nalgebra_sparse::CsrMatrix;
use fenris_transfer::quadrature::tetrahedron;
use fenris_transfer::TransferError;
use itertools::izip;
use log::{debug, warn};

/// Computes the element Hessian for the given nodal displacements (one column per node).
///
/// The result uses the interleaved layout, with local degree of freedom `3 * i + d` holding
/// component `d` of node `i`. Elements with a singular Jacobian contribute nothing.
pub fn element_hyperelastic_hessian<E, M>(
    element: &E,
    material: &M,
    parameters: &M::Parameters,
    displacement: &Matrix3xX<f64>,
    weights: &[f64],
    points: &[Point3<f64>],
) -> DMatrix<f64>
where
    E: FiniteElement<f64>,
    M: HyperelasticMaterial<f64>,
{
    let n = element.num_nodes();
    assert_eq!(displacement.ncols(), n, "Displacement must have one column per element node");
    let mut ref_gradients = Matrix3xX::zeros(n);
    let mut hessian = DMatrix::zeros(3 * n, 3 * n);

    for (w, xi) in izip!(weights, points) {
        let j = element.reference_jacobian(xi);
        let Some(j_inv) = j.try_inverse() else {
            warn!("Skipping element with singular Jacobian in Hessian assembly");
            return DMatrix::zeros(3 * n, 3 * n);
        };
        element.populate_basis_gradients(&mut ref_gradients, xi);
        let gradients = j_inv.transpose() * &ref_gradients;
        let deformation_gradient = Matrix3::identity() + displacement * gradients.transpose();
        let scale = w * j.determinant().abs();

        for a in 0..n {
            let grad_a: Vector3<f64> = gradients.column(a).into_owned();
            for b in 0..n {
                let grad_b: Vector3<f64> = gradients.column(b).into_owned();
                let contraction =
                    material.compute_stress_contraction(&deformation_gradient, &grad_a, &grad_b, parameters);
                let mut block = hessian.fixed_view_mut::<3, 3>(3 * a, 3 * b);
                block += contraction * scale;
            }
        }
    }
    hessian
}

/// Assembles the Hessian of the elastic energy at the given displacement.
///
/// The displacement is an interleaved 3D field with one entry per mesh node and component.
pub fn assemble_hyperelastic_hessian<C, M>(
    mesh: &Mesh<f64, C>,
    material: &M,
    parameters: &M::Parameters,
    displacement: &DVector<f64>,
) -> Result<CsrMatrix<f64>, TransferError>
where
    C: ElementConnectivity<f64>,
    M: HyperelasticMaterial<f64>,
{
    let num_dofs = 3 * mesh.num_nodes();
    if displacement.len() != num_dofs {
        return Err(TransferError::InputShapeMismatch {
            context: "displacement",
            expected: (num_dofs, 1),
            actual: (displacement.len(), 1),
        });
    }

    let (weights, points) = tetrahedron(2 * mesh.polynomial_order())?;
    let element_matrices = mesh
        .elements()
        .zip(mesh.connectivity())
        .map(|(element, conn)| {
            let nodes = conn.vertex_indices();
            let u_element = Matrix3xX::from_fn(nodes.len(), |i, a| displacement[3 * nodes[a] + i]);
            let h = element_hyperelastic_hessian(&element, material, parameters, &u_element, &weights, &points);
            (nodes, h)
        });
    let hessian = assemble_element_matrices(mesh.num_nodes(), 3, element_matrices);
    debug!(
        "Assembled elastic Hessian with {} non-zeros over {} elements",
        hessian.nnz(),
        mesh.num_elements()
    );
    Ok(hessian)
}

/// Assembles the Hessian of the elastic energy in the undeformed configuration.
pub fn assemble_rest_pose_hessian<C, M>(
    mesh: &Mesh<f64, C>,
    material: &M,
    parameters: &M::Parameters,
) -> Result<CsrMatrix<f64>, TransferError>
where
    C: ElementConnectivity<f64>,
    M: HyperelasticMaterial<f64>,
{
    let zero_displacement = DVector::zeros(3 * mesh.num_nodes());
    assemble_hyperelastic_hessian(mesh, material, parameters, &zero_displacement)
}
