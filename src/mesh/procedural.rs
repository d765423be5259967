//! Basic procedural mesh generation routines.
use crate::connectivity::{Tet10Connectivity, Tet4Connectivity, TET10_EDGES};
use crate::element::Tet4Element;
use crate::mesh::{Mesh, Tet10Mesh, Tet4Mesh};
use crate::Real;
use itertools::Itertools;
use nalgebra::{Point3, Vector3};
use numeric_literals::replace_float_literals;
use rustc_hash::FxHashMap;

/// Offsets of the corners of a hexahedral cell, indexed by `x + 2y + 4z`.
const CUBE_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

pub fn create_unit_box_uniform_tet_mesh<T: Real>(cells_per_dim: usize) -> Tet4Mesh<T> {
    create_rectangular_uniform_tet_mesh(T::one(), 1, 1, 1, cells_per_dim, &Point3::origin())
}

/// Generates an axis-aligned box mesh of tetrahedra.
///
/// The box has dimensions given as multiples of the unit length, starting at `origin`.
/// Each of the `cells_per_unit` cells per unit length is split into six positively oriented
/// tetrahedra sharing the main diagonal of the cell, which gives a conforming mesh.
pub fn create_rectangular_uniform_tet_mesh<T: Real>(
    unit_length: T,
    units_x: usize,
    units_y: usize,
    units_z: usize,
    cells_per_unit: usize,
    origin: &Point3<T>,
) -> Tet4Mesh<T> {
    if cells_per_unit == 0 || units_x == 0 || units_y == 0 || units_z == 0 {
        return Mesh::from_vertices_and_connectivity_unchecked(Vec::new(), Vec::new());
    }

    let to_t = |i: usize| T::from_usize(i).unwrap_or_else(T::zero);
    let cell_size = unit_length / to_t(cells_per_unit);

    let num_cells = [units_x * cells_per_unit, units_y * cells_per_unit, units_z * cells_per_unit];
    let [nvx, nvy, nvz] = num_cells.map(|n| n + 1);
    let to_global_vertex_index = |i: usize, j: usize, k: usize| (nvx * nvy) * k + nvx * j + i;

    let mut vertices = Vec::with_capacity(nvx * nvy * nvz);
    for k in 0..nvz {
        for j in 0..nvy {
            for i in 0..nvx {
                vertices.push(origin + Vector3::new(to_t(i), to_t(j), to_t(k)) * cell_size);
            }
        }
    }

    // Paths from corner 0 to corner 7 along the cell edges, one per ordering of the axes
    let diagonal_paths: Vec<[usize; 4]> = (0..3)
        .permutations(3)
        .map(|axes| {
            let a = 1 << axes[0];
            let b = a | (1 << axes[1]);
            [0, a, b, 7]
        })
        .collect();

    let mut connectivity = Vec::with_capacity(6 * num_cells.iter().product::<usize>());
    for k in 0..num_cells[2] {
        for j in 0..num_cells[1] {
            for i in 0..num_cells[0] {
                let corner_index = |c: usize| {
                    let [di, dj, dk] = CUBE_CORNERS[c];
                    to_global_vertex_index(i + di, j + dj, k + dk)
                };
                for path in &diagonal_paths {
                    let mut tet = path.map(|c| corner_index(c));
                    let element = Tet4Element::from_vertices(tet.map(|v| vertices[v]));
                    if element.signed_volume() < T::zero() {
                        tet.swap(2, 3);
                    }
                    connectivity.push(Tet4Connectivity(tet));
                }
            }
        }
    }

    Mesh::from_vertices_and_connectivity_unchecked(vertices, connectivity)
}

impl<'a, T: Real> From<&'a Tet4Mesh<T>> for Tet10Mesh<T> {
    /// Adds a node at the midpoint of every edge, shared between the elements incident to it.
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn from(tet4_mesh: &'a Tet4Mesh<T>) -> Self {
        let mut vertices = tet4_mesh.vertices().to_vec();
        let mut edge_vertex_index_map = FxHashMap::default();
        let mut connectivity = Vec::with_capacity(tet4_mesh.num_elements());

        for Tet4Connectivity(tet4_indices) in tet4_mesh.connectivity() {
            let mut tet10_indices = [0usize; 10];
            tet10_indices[..4].copy_from_slice(tet4_indices);

            for (local_edge, &[a, b]) in TET10_EDGES.iter().enumerate() {
                let (a, b) = (tet4_indices[a], tet4_indices[b]);
                // Sort the pair so that edges are uniquely described
                let edge = (a.min(b), a.max(b));
                let index = *edge_vertex_index_map.entry(edge).or_insert_with(|| {
                    let new_vertex_index = vertices.len();
                    let midpoint = Point3::from((vertices[a].coords + vertices[b].coords) * 0.5);
                    vertices.push(midpoint);
                    new_vertex_index
                });
                tet10_indices[4 + local_edge] = index;
            }

            connectivity.push(Tet10Connectivity(tet10_indices));
        }

        Mesh::from_vertices_and_connectivity_unchecked(vertices, connectivity)
    }
}
