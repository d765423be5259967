use super::{box_mesh, lame_parameters, translation_field};
use fenris_transfer::eigen::DenseEigensolver;
use fenris_transfer::mesh::procedural::create_rectangular_uniform_tet_mesh;
use fenris_transfer::nalgebra::{Point3, Vector3};
use fenris_transfer::transfer::{
    assemble_regularized_system, CholeskySettings, CholeskyTransferOperator, LowRankSettings, LowRankTransferOperator,
    TransferOperator, TransferSettings,
};
use fenris_transfer::TransferError;
use fenris_transfer_solid::assemble_rest_pose_hessian;
use fenris_transfer_solid::materials::LinearElasticMaterial;
use matrixcompare::assert_matrix_eq;

#[test]
fn elastic_regularization_preserves_translations() -> eyre::Result<()> {
    // Translations lie in the null space of both regularization terms, so the transfer
    // between identical meshes reproduces them exactly
    let mesh = box_mesh(2);
    let hessian = assemble_rest_pose_hessian(&mesh, &LinearElasticMaterial, &lame_parameters())?;
    let settings = TransferSettings {
        stiffness_weight: 1e-3,
        ..TransferSettings::default()
    };
    let system = assemble_regularized_system(&mesh, &mesh, &mesh, Some(&hessian), &settings)?;
    let operator = CholeskyTransferOperator::new(&system, &CholeskySettings::default(), &DenseEigensolver::default())?;

    let field = translation_field(mesh.num_nodes(), Vector3::new(0.5, -1.0, 2.0));
    let transferred = operator.apply(&field)?;
    assert_matrix_eq!(transferred, field, comp = abs, tol = 1e-8);
    Ok(())
}

#[test]
fn modal_cage_transfer_with_elastic_regularization() -> eyre::Result<()> {
    // A fine model inside a coarse cage that encloses it
    let model = create_rectangular_uniform_tet_mesh(0.25, 2, 2, 2, 2, &Point3::new(0.25, 0.25, 0.25));
    let cage = box_mesh(1);
    let hessian = assemble_rest_pose_hessian(&cage, &LinearElasticMaterial, &lame_parameters())?;
    let settings = TransferSettings {
        stiffness_weight: 1e-4,
        smoothing_weight: 1e-4,
        ..TransferSettings::default()
    };
    let system = assemble_regularized_system(&model, &model, &cage, Some(&hessian), &settings)?;

    let solver = DenseEigensolver::default();
    let direct = CholeskyTransferOperator::new(&system, &CholeskySettings::default(), &solver)?;
    let all_modes = LowRankSettings {
        modes: 3 * cage.num_nodes(),
        threshold: 1e-12,
        ..LowRankSettings::default()
    };
    let low_rank = LowRankTransferOperator::new(&system, &all_modes, &solver)?;
    assert_eq!(low_rank.rank(), 3 * cage.num_nodes());

    let field = translation_field(model.num_nodes(), Vector3::new(1.0, 2.0, 3.0));
    let u_direct = direct.apply(&field)?;
    let u_low_rank = low_rank.apply(&field)?;
    let expected = translation_field(cage.num_nodes(), Vector3::new(1.0, 2.0, 3.0));
    assert_matrix_eq!(u_direct, expected, comp = abs, tol = 1e-6);
    assert_matrix_eq!(u_low_rank, u_direct, comp = abs, tol = 1e-6);
    Ok(())
}

#[test]
fn hessian_of_wrong_size_is_rejected() -> eyre::Result<()> {
    let mesh = box_mesh(1);
    let other = box_mesh(2);
    let hessian = assemble_rest_pose_hessian(&other, &LinearElasticMaterial, &lame_parameters())?;
    let result = assemble_regularized_system(&mesh, &mesh, &mesh, Some(&hessian), &TransferSettings::default());
    assert!(matches!(
        result,
        Err(TransferError::InputShapeMismatch {
            context: "elastic Hessian",
            ..
        })
    ));
    Ok(())
}
