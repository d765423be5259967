use super::{box_mesh, lame_parameters};
use fenris_transfer::eigen::{
    DenseEigensolver, EigenDecomposition, EigenTarget, EigensolveError, ShiftInvertSubspaceIteration,
    SymmetricEigensolver,
};
use fenris_transfer::nalgebra_sparse::CsrMatrix;
use fenris_transfer::mesh::Tet10Mesh;
use fenris_transfer_solid::materials::{LinearElasticMaterial, StableNeoHookeanMaterial};
use fenris_transfer_solid::{compute_modal_basis, ModalError, DEFAULT_MODAL_SHIFT};
use matrixcompare::assert_scalar_eq;

#[test]
fn modal_basis_has_unit_modes_and_six_rigid_modes() -> eyre::Result<()> {
    let mesh = box_mesh(2);
    let basis = compute_modal_basis(
        &mesh,
        1.0,
        &LinearElasticMaterial,
        &lame_parameters(),
        10,
        DEFAULT_MODAL_SHIFT,
        &DenseEigensolver::default(),
    )?;

    assert_eq!(basis.len(), 10);
    assert_eq!(basis.modes.nrows(), 3 * mesh.num_nodes());
    for mode in basis.modes.column_iter() {
        assert_scalar_eq!(mode.norm(), 1.0, comp = abs, tol = 1e-12);
    }
    assert!(basis
        .frequencies
        .iter()
        .all(|omega| omega.is_finite() && *omega >= 0.0));

    // Ordered by distance from a shift just below zero, so the rigid modes come first
    let rigid_scale = basis.frequencies[6];
    assert!(rigid_scale > 1.0);
    for i in 0..6 {
        assert!(basis.frequencies[i] < 1e-4 * rigid_scale);
    }
    for i in 6..9 {
        assert!(basis.frequencies[i] <= basis.frequencies[i + 1]);
    }
    Ok(())
}

#[test]
fn modal_basis_frequencies_agree_between_eigensolvers() -> eyre::Result<()> {
    let mesh = box_mesh(2);
    let compute = |solver: &dyn fenris_transfer::eigen::SymmetricEigensolver| {
        compute_modal_basis(
            &mesh,
            1.0,
            &StableNeoHookeanMaterial,
            &lame_parameters(),
            8,
            DEFAULT_MODAL_SHIFT,
            solver,
        )
    };
    let dense = compute(&DenseEigensolver::default())?;
    let iterative = compute(&ShiftInvertSubspaceIteration::default())?;

    let scale = dense.frequencies.amax();
    for (omega_dense, omega_iterative) in dense.frequencies.iter().zip(iterative.frequencies.iter()) {
        assert_scalar_eq!(omega_dense / scale, omega_iterative / scale, comp = abs, tol = 1e-3);
    }
    Ok(())
}

#[test]
fn modal_basis_for_quadratic_mesh() -> eyre::Result<()> {
    let mesh = Tet10Mesh::from(&box_mesh(1));
    let basis = compute_modal_basis(
        &mesh,
        2.0,
        &LinearElasticMaterial,
        &lame_parameters(),
        7,
        DEFAULT_MODAL_SHIFT,
        &DenseEigensolver::default(),
    )?;
    assert_eq!(basis.len(), 7);
    assert!(basis.frequencies[6] > 1.0);
    assert!(basis.mode(6).is_some());
    assert!(basis.mode(7).is_none());
    Ok(())
}

#[test]
fn modal_basis_rejects_non_positive_density() {
    let mesh = box_mesh(1);
    let result = compute_modal_basis(
        &mesh,
        0.0,
        &LinearElasticMaterial,
        &lame_parameters(),
        4,
        DEFAULT_MODAL_SHIFT,
        &DenseEigensolver::default(),
    );
    assert_eq!(result, Err(ModalError::InvalidDensity(0.0)));
}

struct NonConvergingEigensolver;

impl SymmetricEigensolver for NonConvergingEigensolver {
    fn solve(
        &self,
        _matrix: &CsrMatrix<f64>,
        _mass: Option<&CsrMatrix<f64>>,
        _count: usize,
        _target: EigenTarget,
    ) -> Result<EigenDecomposition, EigensolveError> {
        Err(EigensolveError::NoConvergence { iterations: 5 })
    }
}

#[test]
fn modal_basis_reports_eigensolver_failure() {
    let mesh = box_mesh(1);
    let result = compute_modal_basis(
        &mesh,
        1.0,
        &LinearElasticMaterial,
        &lame_parameters(),
        4,
        DEFAULT_MODAL_SHIFT,
        &NonConvergingEigensolver,
    );
    assert_eq!(
        result,
        Err(ModalError::Eigensolve(EigensolveError::NoConvergence { iterations: 5 }))
    );
}
