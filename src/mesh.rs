use crate::connectivity::{Connectivity, Tet10Connectivity, Tet4Connectivity};
use crate::element::ElementConnectivity;
use crate::geometry::AxisAlignedBoundingBox;
use crate::Real;
use nalgebra::{Point3, Scalar, Vector3};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

pub mod procedural;

/// Index-based data structure for conforming tetrahedral meshes.
///
/// Every connectivity index is guaranteed to refer to a valid vertex.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(bound(
    serialize = "T: Serialize, C: Serialize",
    deserialize = "T: Deserialize<'de>, C: Deserialize<'de>"
))]
pub struct Mesh<T: Scalar, C> {
    vertices: Vec<Point3<T>>,
    connectivity: Vec<C>,
}

pub type Tet4Mesh<T> = Mesh<T, Tet4Connectivity>;
pub type Tet10Mesh<T> = Mesh<T, Tet10Connectivity>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// An element references a vertex that does not exist.
    IndexOutOfBounds {
        element: usize,
        vertex_index: usize,
        num_vertices: usize,
    },
}

impl Display for MeshError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds {
                element,
                vertex_index,
                num_vertices,
            } => write!(
                f,
                "element {element} references vertex {vertex_index}, but the mesh only has {num_vertices} vertices"
            ),
        }
    }
}

impl Error for MeshError {}

impl<T: Scalar, C> Mesh<T, C> {
    pub fn vertices(&self) -> &[Point3<T>] {
        &self.vertices
    }

    pub fn connectivity(&self) -> &[C] {
        &self.connectivity
    }

    /// The number of nodes, i.e. the number of degrees of freedom per field component.
    pub fn num_nodes(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_elements(&self) -> usize {
        self.connectivity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectivity.is_empty()
    }

    pub(crate) fn from_vertices_and_connectivity_unchecked(vertices: Vec<Point3<T>>, connectivity: Vec<C>) -> Self {
        Self { vertices, connectivity }
    }
}

impl<T: Scalar, C: Connectivity> Mesh<T, C> {
    /// Constructs a mesh, checking that every connectivity index refers to an existing vertex.
    pub fn try_from_vertices_and_connectivity(
        vertices: Vec<Point3<T>>,
        connectivity: Vec<C>,
    ) -> Result<Self, MeshError> {
        let num_vertices = vertices.len();
        for (element, conn) in connectivity.iter().enumerate() {
            if let Some(&vertex_index) = conn.vertex_indices().iter().find(|&&idx| idx >= num_vertices) {
                return Err(MeshError::IndexOutOfBounds {
                    element,
                    vertex_index,
                    num_vertices,
                });
            }
        }
        Ok(Self { vertices, connectivity })
    }

    /// The polynomial order of the basis functions of the mesh.
    pub fn polynomial_order(&self) -> usize {
        self.connectivity
            .iter()
            .map(Connectivity::polynomial_order)
            .max()
            .unwrap_or(1)
    }
}

impl<T: Real, C: ElementConnectivity<T>> Mesh<T, C> {
    pub fn element(&self, index: usize) -> Option<C::Element> {
        self.connectivity
            .get(index)
            .and_then(|conn| conn.element(&self.vertices))
    }

    pub fn elements(&self) -> impl '_ + Iterator<Item = C::Element> {
        self.connectivity.iter().map(move |conn| {
            conn.element(&self.vertices)
                .expect("Mesh is not allowed to contain elements with indices out of bounds.")
        })
    }
}

impl<T: Real, C> Mesh<T, C> {
    pub fn bounding_box(&self) -> Option<AxisAlignedBoundingBox<T>> {
        AxisAlignedBoundingBox::from_points(&self.vertices)
    }

    /// The average of all vertex positions.
    pub fn centroid(&self) -> Option<Point3<T>> {
        let n = T::from_usize(self.vertices.len())?;
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |sum, v| sum + v.coords);
        Some(Point3::from(sum / n))
    }
}
