//! `proptest` strategies for elements, reference coordinates and meshes.
use crate::element::{FiniteElement, Tet4Element};
use crate::mesh::procedural::create_rectangular_uniform_tet_mesh;
use crate::mesh::Tet4Mesh;
use ::proptest::prelude::*;
use nalgebra::{Point3, Vector3};

pub fn point3() -> impl Strategy<Value = Point3<f64>> {
    // Keep coordinates in a moderate range so that geometric predicates stay well-conditioned
    let range = -10.0..10.0;
    [range.clone(), range.clone(), range].prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Points in the reference tetrahedron, generated from barycentric coordinates.
pub fn reference_tet_point() -> impl Strategy<Value = Point3<f64>> {
    [0.0..1.0, 0.0..1.0, 0.0..1.0, 0.0..1.0].prop_filter_map("barycentric weights must not all vanish", |weights| {
        let total: f64 = weights.iter().sum();
        (total > 1e-6).then(|| {
            let reference = Tet4Element::<f64>::reference();
            reference
                .vertices()
                .iter()
                .zip(weights)
                .fold(Point3::origin(), |xi, (v, w)| xi + v.coords * (w / total))
        })
    })
}

impl Arbitrary for Tet4Element<f64> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        [point3(), point3(), point3(), point3()]
            .prop_filter_map("tetrahedron must not be degenerate", |[a, b, c, d]| {
                let element = Tet4Element::from_vertices([a, b, c, d]);
                // Reject slivers relative to the element size
                let diameter = element.diameter();
                let volume = element.signed_volume();
                if volume.abs() < 1e-2 * diameter.powi(3) {
                    None
                } else if volume < 0.0 {
                    Some(Tet4Element::from_vertices([a, b, d, c]))
                } else {
                    Some(element)
                }
            })
            .boxed()
    }
}

/// Small box meshes with between one and `max_cells_per_dim` cells along each axis.
pub fn tet4_box_mesh(max_cells_per_dim: usize) -> impl Strategy<Value = Tet4Mesh<f64>> {
    let cells = 1..=max_cells_per_dim.max(1);
    (cells.clone(), cells.clone(), cells, 0.5..2.0, [-1.0..1.0, -1.0..1.0, -1.0..1.0]).prop_map(
        |(nx, ny, nz, unit_length, [x, y, z])| {
            create_rectangular_uniform_tet_mesh(unit_length, nx, ny, nz, 1, &Point3::from(Vector3::new(x, y, z)))
        },
    )
}
