use super::constant_field;
use fenris_transfer::assembly::{assemble_lumped_mass_matrix, assemble_mass_matrix, assemble_stiffness_matrix, Lumping};
use fenris_transfer::mesh::procedural::create_unit_box_uniform_tet_mesh;
use fenris_transfer::mesh::{Tet10Mesh, Tet4Mesh};
use fenris_transfer::nalgebra::{DMatrix, Vector3};
use fenris_transfer::regularization::{regularized_system, smoothing_energy};
use fenris_transfer::sparse::{diagonal_of, to_dense};
use fenris_transfer::TransferError;
use matrixcompare::assert_matrix_eq;

#[test]
fn smoothing_energy_of_power_one_is_the_stiffness_matrix() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(2);
    let u = smoothing_energy(&mesh, 3, 1)?;
    let k = assemble_stiffness_matrix(&mesh, 3)?;
    assert_matrix_eq!(to_dense(&u), to_dense(&k), comp = float);
    Ok(())
}

#[test]
fn smoothing_energy_iterates_with_inverse_lumped_mass() -> eyre::Result<()> {
    let mesh = Tet10Mesh::from(&create_unit_box_uniform_tet_mesh::<f64>(1));
    let k = to_dense(&assemble_stiffness_matrix(&mesh, 1)?);
    let m = diagonal_of(&assemble_lumped_mass_matrix(&mesh, 1.0, 1, Lumping::DiagonalScaling)?);
    let m_inv = DMatrix::from_diagonal(&m.map(|m_ii| 1.0 / m_ii));

    let u2 = to_dense(&smoothing_energy(&mesh, 1, 2)?);
    let expected2 = &k * &m_inv * &k;
    let scale = expected2.amax();
    assert_matrix_eq!(u2 / scale, &expected2 / scale, comp = abs, tol = 1e-12);

    let u3 = to_dense(&smoothing_energy(&mesh, 1, 3)?);
    let expected3 = &expected2 * &m_inv * &k;
    let scale = expected3.amax();
    assert_matrix_eq!(u3 / scale, expected3 / scale, comp = abs, tol = 1e-12);
    Ok(())
}

#[test]
fn smoothing_energy_annihilates_constants_and_is_semidefinite() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(2);
    let c = constant_field(mesh.num_nodes(), Vector3::new(1.0, 2.0, -1.0));
    for power in 1..=3 {
        let u = smoothing_energy(&mesh, 3, power)?;
        let u_dense = to_dense(&u);
        let scale = u_dense.amax();
        assert_matrix_eq!((&u * &c) / scale, c.map(|_| 0.0), comp = abs, tol = 1e-12);
        let u_sym = (&u_dense + u_dense.transpose()) * 0.5;
        assert!(u_sym.symmetric_eigenvalues().min() > -1e-10 * scale);
    }
    Ok(())
}

#[test]
fn smoothing_energy_rejects_zero_power() {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(1);
    assert!(matches!(smoothing_energy(&mesh, 3, 0), Err(TransferError::InvalidSettings(_))));
}

#[test]
fn regularized_system_combines_weighted_terms() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(1);
    let a = assemble_mass_matrix(&mesh, 1.0, 3)?;
    let u = smoothing_energy(&mesh, 3, 1)?;
    // Any symmetric matrix of matching shape serves as a stand-in Hessian
    let h = assemble_mass_matrix(&mesh, 7.0, 3)?;

    let combined = regularized_system(&a, &u, Some(&h), 5.0, 0.5)?;
    let expected = to_dense(&a) + to_dense(&u) * 5.0 + to_dense(&h) * 0.5;
    assert_matrix_eq!(to_dense(&combined), expected, comp = abs, tol = 1e-12);

    let without_hessian = regularized_system(&a, &u, None, 5.0, 0.5)?;
    let expected = to_dense(&a) + to_dense(&u) * 5.0;
    assert_matrix_eq!(to_dense(&without_hessian), expected, comp = abs, tol = 1e-12);

    let unregularized = regularized_system(&a, &u, Some(&h), 0.0, 0.0)?;
    assert_eq!(unregularized, a);
    Ok(())
}

#[test]
fn regularized_system_rejects_mismatched_shapes() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(1);
    let other: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(2);
    let a = assemble_mass_matrix(&mesh, 1.0, 3)?;
    let u = smoothing_energy(&mesh, 3, 1)?;
    let wrong = smoothing_energy(&other, 3, 1)?;

    assert!(matches!(
        regularized_system(&a, &u, Some(&wrong), 1.0, 1.0),
        Err(TransferError::InputShapeMismatch {
            context: "elastic Hessian",
            ..
        })
    ));
    assert!(matches!(
        regularized_system(&a, &wrong, None, 1.0, 1.0),
        Err(TransferError::InputShapeMismatch {
            context: "smoothing energy",
            ..
        })
    ));
    Ok(())
}
