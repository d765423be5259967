use fenris_transfer::connectivity::{Connectivity, Tet4Connectivity};
use fenris_transfer::element::ElementConnectivity;
use fenris_transfer::mesh::procedural::{create_rectangular_uniform_tet_mesh, create_unit_box_uniform_tet_mesh};
use fenris_transfer::mesh::{MeshError, Tet10Mesh, Tet4Mesh};
use fenris_transfer::nalgebra::{Point3, Vector3};
use fenris_transfer::proptest::tet4_box_mesh;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq, prop_assert_scalar_eq};
use proptest::prelude::*;

#[test]
fn unit_box_mesh_has_expected_size() {
    for n in [1, 2, 3] {
        let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(n);
        assert_eq!(mesh.num_nodes(), (n + 1).pow(3));
        assert_eq!(mesh.num_elements(), 6 * n.pow(3));
        assert_eq!(mesh.polynomial_order(), 1);

        let bounds = mesh.bounding_box().unwrap();
        assert_matrix_eq!(bounds.min().coords, Vector3::zeros(), comp = float);
        assert_matrix_eq!(bounds.max().coords, Vector3::repeat(1.0), comp = float);
    }
}

#[test]
fn rectangular_mesh_respects_origin_and_units() {
    let origin = Point3::new(-1.0, 2.0, 0.5);
    let mesh: Tet4Mesh<f64> = create_rectangular_uniform_tet_mesh(0.5, 2, 1, 3, 2, &origin);
    assert_eq!(mesh.num_nodes(), 5 * 3 * 7);
    assert_eq!(mesh.num_elements(), 6 * 4 * 2 * 6);

    let bounds = mesh.bounding_box().unwrap();
    assert_matrix_eq!(bounds.min().coords, origin.coords, comp = float);
    assert_matrix_eq!(bounds.max().coords, Vector3::new(0.0, 2.5, 2.0), comp = abs, tol = 1e-12);
}

#[test]
fn rectangular_mesh_with_zero_cells_is_empty() {
    let mesh: Tet4Mesh<f64> = create_rectangular_uniform_tet_mesh(1.0, 1, 0, 1, 1, &Point3::origin());
    assert!(mesh.is_empty());
    assert_eq!(mesh.num_nodes(), 0);
    assert!(mesh.bounding_box().is_none());
    assert!(mesh.centroid().is_none());
}

#[test]
fn tet10_mesh_shares_edge_midpoints() {
    for n in [1, 2] {
        let tet4_mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(n);
        let tet10_mesh = Tet10Mesh::from(&tet4_mesh);
        assert_eq!(tet10_mesh.num_elements(), tet4_mesh.num_elements());
        // Midpoints of the structured mesh coincide with a grid of twice the resolution
        assert_eq!(tet10_mesh.num_nodes(), (2 * n + 1).pow(3));
        assert_eq!(tet10_mesh.polynomial_order(), 2);
        assert_eq!(&tet10_mesh.vertices()[..tet4_mesh.num_nodes()], tet4_mesh.vertices());

        for (conn10, conn4) in tet10_mesh.connectivity().iter().zip(tet4_mesh.connectivity()) {
            let corners = Tet4Connectivity::from(conn10);
            assert_eq!(&corners, conn4);
            assert_eq!(&conn10.corner_indices()[..], conn4.vertex_indices());
        }
    }
}

#[test]
fn mesh_construction_rejects_out_of_bounds_indices() {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let valid = Tet4Mesh::try_from_vertices_and_connectivity(vertices.clone(), vec![Tet4Connectivity([0, 1, 2, 3])]);
    assert!(valid.is_ok());

    let invalid = Tet4Mesh::try_from_vertices_and_connectivity(vertices, vec![Tet4Connectivity([0, 1, 2, 4])]);
    assert_eq!(
        invalid,
        Err(MeshError::IndexOutOfBounds {
            element: 0,
            vertex_index: 4,
            num_vertices: 4,
        })
    );
}

#[test]
fn mesh_centroid() {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(3);
    let centroid = mesh.centroid().unwrap();
    assert_matrix_eq!(centroid.coords, Vector3::repeat(0.5), comp = abs, tol = 1e-12);
}

#[test]
fn mesh_survives_json() {
    let mesh: Tet4Mesh<f64> = create_unit_box_uniform_tet_mesh(1);
    let json = serde_json::to_string(&mesh).unwrap();
    let parsed: Tet4Mesh<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, mesh);
}

proptest! {
    #[test]
    fn box_mesh_elements_are_positively_oriented_and_fill_the_box(mesh in tet4_box_mesh(3)) {
        let bounds = mesh.bounding_box().unwrap();
        let box_volume = bounds.extents().product();
        let mut total_volume = 0.0;
        for conn in mesh.connectivity() {
            let element = conn.element(mesh.vertices()).unwrap();
            prop_assert!(element.signed_volume() > 0.0);
            total_volume += element.signed_volume();
        }
        prop_assert_scalar_eq!(total_volume, box_volume, comp = abs, tol = 1e-10 * box_volume.max(1.0));
    }
}
