//! Quadrature rules on the reference tetrahedron.
use crate::element::{ElementConnectivity, FiniteElement};
use crate::mesh::Mesh;
use crate::Real;
use fenris_quadrature::polyquad;
use nalgebra::{convert, Point3};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Weights and points of a quadrature rule.
pub type QuadraturePair3d<T> = (Vec<T>, Vec<Point3<T>>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuadratureError {
    UnsupportedStrength { strength: usize },
}

impl Display for QuadratureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedStrength { strength } => {
                write!(f, "no tetrahedral quadrature rule of strength {strength} is available")
            }
        }
    }
}

impl Error for QuadratureError {}

/// Returns a quadrature rule on the reference tetrahedron that integrates polynomials of
/// total degree `strength` exactly.
///
/// The rules come from `polyquad` and have positive weights with points inside the element.
/// The weights sum to the reference volume $4/3$.
pub fn tetrahedron<T: Real>(strength: usize) -> Result<QuadraturePair3d<T>, QuadratureError> {
    let (weights, points) =
        polyquad::tetrahedron(strength).map_err(|_| QuadratureError::UnsupportedStrength { strength })?;
    let weights = weights.into_iter().map(convert).collect();
    let points = points
        .into_iter()
        .map(|[x, y, z]| Point3::new(convert(x), convert(y), convert(z)))
        .collect();
    Ok((weights, points))
}

/// Physical quadrature points and weights for every element of the mesh.
///
/// Weights include the absolute Jacobian determinant of the element map, so that they sum to
/// the mesh volume.
pub fn mesh_quadrature<T, C>(mesh: &Mesh<T, C>, strength: usize) -> Result<QuadraturePair3d<T>, QuadratureError>
where
    T: Real,
    C: ElementConnectivity<T>,
{
    let (ref_weights, ref_points) = tetrahedron::<T>(strength)?;
    let n = mesh.num_elements() * ref_weights.len();
    let mut weights = Vec::with_capacity(n);
    let mut points = Vec::with_capacity(n);

    for element in mesh.elements() {
        for (w, xi) in ref_weights.iter().zip(&ref_points) {
            let j_det = element.reference_jacobian(xi).determinant().abs();
            weights.push(*w * j_det);
            points.push(element.map_reference_coords(xi));
        }
    }
    Ok((weights, points))
}
