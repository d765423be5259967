use super::field_from_fn;
use fenris_transfer::mesh::procedural::create_unit_box_uniform_tet_mesh;
use fenris_transfer::mesh::{Tet10Mesh, Tet4Mesh};
use fenris_transfer::nalgebra::{DMatrix, DVector, Point3, Vector3};
use fenris_transfer::sampling::{shape_function_matrix, OutOfDomainPolicy, SamplingOptions};
use fenris_transfer::space::SpatiallyIndexed;
use fenris_transfer::sparse::to_dense;
use fenris_transfer::TransferError;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};

fn interior_points() -> Vec<Point3<f64>> {
    (0..50)
        .map(|i| {
            let t = i as f64;
            Point3::new(
                0.5 + 0.45 * (0.7 * t).sin(),
                0.5 + 0.45 * (1.3 * t).cos(),
                0.5 + 0.45 * (0.3 * t + 1.0).sin(),
            )
        })
        .collect()
}

#[test]
fn sampling_at_nodes_reproduces_nodal_values() -> eyre::Result<()> {
    let tet4_mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(2);
    let tet10_mesh = Tet10Mesh::from(&tet4_mesh);

    let n = shape_function_matrix(
        &SpatiallyIndexed::from_mesh(&tet4_mesh),
        tet4_mesh.vertices(),
        1,
        &SamplingOptions::default(),
    )?;
    let identity = DMatrix::<f64>::identity(tet4_mesh.num_nodes(), tet4_mesh.num_nodes());
    assert_matrix_eq!(to_dense(&n), identity, comp = abs, tol = 1e-12);

    let n = shape_function_matrix(
        &SpatiallyIndexed::from_mesh(&tet10_mesh),
        tet10_mesh.vertices(),
        1,
        &SamplingOptions::default(),
    )?;
    let identity = DMatrix::<f64>::identity(tet10_mesh.num_nodes(), tet10_mesh.num_nodes());
    assert_matrix_eq!(to_dense(&n), identity, comp = abs, tol = 1e-12);
    Ok(())
}

#[test]
fn sampling_rows_sum_to_one_and_are_replicated_per_component() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(3);
    let points = interior_points();
    let n = to_dense(&shape_function_matrix(
        &SpatiallyIndexed::from_mesh(&mesh),
        &points,
        3,
        &SamplingOptions::default(),
    )?);
    assert_eq!(n.nrows(), 3 * points.len());
    assert_eq!(n.ncols(), 3 * mesh.num_nodes());

    for p in 0..points.len() {
        for d in 0..3 {
            let row = n.row(3 * p + d);
            assert_scalar_eq!(row.sum(), 1.0, comp = abs, tol = 1e-12);
            // Only the columns of component d are populated
            for (col, value) in row.iter().enumerate() {
                if col % 3 != d {
                    assert_eq!(*value, 0.0);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn sampling_reproduces_linear_and_quadratic_fields() -> eyre::Result<()> {
    let tet4_mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(2);
    let tet10_mesh = Tet10Mesh::from(&tet4_mesh);
    let points = interior_points();

    let linear = |x: &Point3<f64>| Vector3::new(2.0 * x.x - x.y + 1.0, x.z, 3.0 * x.x + 0.5 * x.y - x.z);
    let n = shape_function_matrix(&SpatiallyIndexed::from_mesh(&tet4_mesh), &points, 3, &SamplingOptions::default())?;
    let sampled = &n * &field_from_fn(tet4_mesh.vertices(), linear);
    assert_matrix_eq!(sampled, field_from_fn(&points, linear), comp = abs, tol = 1e-12);

    let quadratic = |x: &Point3<f64>| Vector3::new(x.x * x.y, x.z * x.z - x.x, 1.0 + x.y * x.z);
    let n = shape_function_matrix(&SpatiallyIndexed::from_mesh(&tet10_mesh), &points, 3, &SamplingOptions::default())?;
    let sampled = &n * &field_from_fn(tet10_mesh.vertices(), quadratic);
    assert_matrix_eq!(sampled, field_from_fn(&points, quadratic), comp = abs, tol = 1e-12);
    Ok(())
}

#[test]
fn out_of_domain_policies() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(2);
    let space = SpatiallyIndexed::from_mesh(&mesh);
    let points = [Point3::new(0.5, 0.5, 0.5), Point3::new(1.5, 0.5, 0.5), Point3::new(0.25, 0.25, 0.75)];

    let nearest = to_dense(&shape_function_matrix(&space, &points, 1, &SamplingOptions::default())?);
    // The outside point takes the values at its projection (1.0, 0.5, 0.5)
    let field = DVector::from_iterator(mesh.num_nodes(), mesh.vertices().iter().map(|x| x.x + x.y));
    assert_scalar_eq!((nearest.row(1) * &field)[0], 1.5, comp = abs, tol = 1e-12);

    let zero_options = SamplingOptions {
        out_of_domain: OutOfDomainPolicy::Zero,
        ..SamplingOptions::default()
    };
    let zero = to_dense(&shape_function_matrix(&space, &points, 1, &zero_options)?);
    assert_eq!(zero.row(1).amax(), 0.0);
    assert_matrix_eq!(zero.row(0), nearest.row(0), comp = float);
    assert_matrix_eq!(zero.row(2), nearest.row(2), comp = float);

    let error_options = SamplingOptions {
        out_of_domain: OutOfDomainPolicy::Error,
        ..SamplingOptions::default()
    };
    match shape_function_matrix(&space, &points, 1, &error_options) {
        Err(TransferError::PointOutsideMesh { point_index, distance }) => {
            assert_eq!(point_index, 1);
            assert_scalar_eq!(distance, 0.5, comp = abs, tol = 1e-12);
        }
        other => panic!("Expected point outside mesh error, got {other:?}"),
    }

    // A generous tolerance accepts the point
    let tolerant_options = SamplingOptions {
        out_of_domain: OutOfDomainPolicy::Error,
        containment_tolerance: 0.6,
        ..SamplingOptions::default()
    };
    let tolerant = to_dense(&shape_function_matrix(&space, &points, 1, &tolerant_options)?);
    assert_matrix_eq!(tolerant, nearest, comp = float);
    Ok(())
}

#[test]
fn parallel_sampling_matches_sequential_sampling() -> eyre::Result<()> {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(3);
    let space = SpatiallyIndexed::from_mesh(&mesh);
    let points = interior_points();
    let parallel_options = SamplingOptions {
        parallel: true,
        ..SamplingOptions::default()
    };
    let sequential = shape_function_matrix(&space, &points, 2, &SamplingOptions::default())?;
    let parallel = shape_function_matrix(&space, &points, 2, &parallel_options)?;
    assert_eq!(sequential, parallel);
    Ok(())
}

#[test]
fn sampling_rejects_invalid_input() {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(1);
    let space = SpatiallyIndexed::from_mesh(&mesh);
    let points = [Point3::new(0.5, 0.5, 0.5)];
    assert!(matches!(
        shape_function_matrix(&space, &points, 0, &SamplingOptions::default()),
        Err(TransferError::InvalidSettings(_))
    ));

    let empty: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(0);
    let empty_space = SpatiallyIndexed::from_mesh(&empty);
    assert_eq!(
        shape_function_matrix(&empty_space, &points, 1, &SamplingOptions::default()),
        Err(TransferError::EmptyMesh { role: "sampled" })
    );
}
