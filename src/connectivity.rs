//! Element connectivity for tetrahedral meshes.
use serde::{Deserialize, Serialize};

/// Local vertex indices of the four triangular faces of a tetrahedron.
///
/// The faces are ordered such that their normals point outwards for a positively oriented
/// tetrahedron.
pub const TET_FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];

/// Pairs of local vertex indices spanned by the edge nodes of a [`Tet10Connectivity`],
/// in the order in which the edge nodes appear.
pub const TET10_EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [0, 2], [0, 3], [2, 3], [1, 3]];

pub trait Connectivity: Clone {
    /// The polynomial order of the basis functions associated with this connectivity.
    fn polynomial_order(&self) -> usize;

    /// Global indices of the nodes of the element.
    fn vertex_indices(&self) -> &[usize];

    /// Global indices of the four corner vertices that define the (affine) element geometry.
    fn corner_indices(&self) -> [usize; 4] {
        let v = self.vertex_indices();
        [v[0], v[1], v[2], v[3]]
    }
}

/// Connectivity of a linear tetrahedron.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tet4Connectivity(pub [usize; 4]);

impl Connectivity for Tet4Connectivity {
    fn polynomial_order(&self) -> usize {
        1
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

/// Connectivity of a quadratic tetrahedron.
///
/// The first four nodes are the corner vertices, followed by the six edge nodes on the
/// edges listed in [`TET10_EDGES`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tet10Connectivity(pub [usize; 10]);

impl From<&Tet10Connectivity> for Tet4Connectivity {
    fn from(tet10: &Tet10Connectivity) -> Self {
        Tet4Connectivity(tet10.corner_indices())
    }
}

impl Connectivity for Tet10Connectivity {
    fn polynomial_order(&self) -> usize {
        2
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}
