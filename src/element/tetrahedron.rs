use crate::connectivity::{Tet10Connectivity, Tet4Connectivity, TET10_EDGES, TET_FACES};
use crate::element::{
    BoundsForElement, ClosestPoint, ClosestPointInElement, ElementConnectivity, FiniteElement,
    FixedNodesReferenceFiniteElement,
};
use crate::geometry::{closest_point_on_triangle, AxisAlignedBoundingBox};
use crate::nalgebra::{distance, Matrix1x4, Matrix3, Matrix3x4, OMatrix, Point3, Scalar, Vector3, U1, U10, U3, U4};
use crate::Real;
use itertools::Itertools;
use nalgebra::distance_squared;
use numeric_literals::replace_float_literals;
use std::cmp::Ordering;

/// Looks up the vertices with the given indices, or `None` if any index is out of bounds.
fn gather_vertices<T: Real, const N: usize>(indices: &[usize; N], vertices: &[Point3<T>]) -> Option<[Point3<T>; N]> {
    let mut gathered = [Point3::origin(); N];
    for (x, &index) in gathered.iter_mut().zip(indices) {
        *x = *vertices.get(index)?;
    }
    Some(gathered)
}

impl<T: Real> ElementConnectivity<T> for Tet4Connectivity {
    type Element = Tet4Element<T>;

    fn element(&self, vertices: &[Point3<T>]) -> Option<Self::Element> {
        gather_vertices(&self.0, vertices).map(Tet4Element::from_vertices)
    }
}

impl<T: Real> ElementConnectivity<T> for Tet10Connectivity {
    type Element = Tet10Element<T>;

    fn element(&self, vertices: &[Point3<T>]) -> Option<Self::Element> {
        gather_vertices(&self.0, vertices).map(Tet10Element::from_vertices)
    }
}

/// A linear tetrahedron with an affine reference-to-physical map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tet4Element<T: Scalar> {
    vertices: [Point3<T>; 4],
}

impl<T: Scalar> Tet4Element<T> {
    pub fn from_vertices(vertices: [Point3<T>; 4]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point3<T>; 4] {
        &self.vertices
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> Tet4Element<T> {
    pub fn reference() -> Self {
        Self::from_vertices([
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ])
    }

    /// Signed volume of the element. Positive for positively oriented elements.
    pub fn signed_volume(&self) -> T {
        self.edge_matrix().determinant() / 6.0
    }

    /// Columns are the edges from the first vertex to the other three.
    fn edge_matrix(&self) -> Matrix3<T> {
        let [a, b, c, d] = &self.vertices;
        Matrix3::from_columns(&[b - a, c - a, d - a])
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> FixedNodesReferenceFiniteElement<T> for Tet4Element<T> {
    type NodalDim = U4;

    /// The barycentric coordinates of `xi` in the reference tetrahedron.
    fn evaluate_basis(&self, xi: &Point3<T>) -> Matrix1x4<T> {
        let shifted = (xi.coords + Vector3::repeat(1.0)) * 0.5;
        Matrix1x4::new(1.0 - shifted.sum(), shifted.x, shifted.y, shifted.z)
    }

    #[rustfmt::skip]
    fn gradients(&self, _xi: &Point3<T>) -> Matrix3x4<T> {
        Matrix3x4::new(
            -0.5, 0.5, 0.0, 0.0,
            -0.5, 0.0, 0.5, 0.0,
            -0.5, 0.0, 0.0, 0.5,
        )
    }
}

/// Whether the reference coordinates lie in the reference tetrahedron, up to a small tolerance.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
fn is_in_reference_tet<T: Real>(xi: &Point3<T>) -> bool {
    let eps = 1e-12;
    xi.iter().all(|&x| x >= -1.0 - eps) && xi.x + xi.y + xi.z <= -1.0 + eps
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> FiniteElement<T> for Tet4Element<T> {
    fn reference_jacobian(&self, _xi: &Point3<T>) -> Matrix3<T> {
        self.edge_matrix() * 0.5
    }

    fn map_reference_coords(&self, xi: &Point3<T>) -> Point3<T> {
        let offset = xi.coords + Vector3::repeat(1.0);
        self.vertices[0] + self.reference_jacobian(xi) * offset
    }

    fn diameter(&self) -> T {
        self.vertices
            .iter()
            .tuple_combinations()
            .map(|(x, y)| distance(x, y))
            .fold(T::zero(), |a, b| a.max(b))
    }
}

impl<T: Real> BoundsForElement<T> for Tet4Element<T> {
    fn element_bounds(&self) -> AxisAlignedBoundingBox<T> {
        let [a, rest @ ..] = &self.vertices;
        rest.iter().fold(AxisAlignedBoundingBox::new(*a, *a), |bounds, x| {
            bounds.enclose(&AxisAlignedBoundingBox::new(*x, *x))
        })
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> ClosestPointInElement<T> for Tet4Element<T> {
    fn closest_point(&self, p: &Point3<T>) -> ClosestPoint<T> {
        // Invert the affine map xi -> a + J (xi + 1)
        let jacobian = self.reference_jacobian(&Point3::origin());
        let interior = jacobian
            .try_inverse()
            .map(|j_inv| Point3::from(j_inv * (p - self.vertices[0]) - Vector3::repeat(1.0)))
            .filter(is_in_reference_tet);
        if let Some(xi) = interior {
            return ClosestPoint::InElement(xi);
        }

        // Outside or degenerate: the nearest of the face projections. Barycentric weights on a
        // face carry over unchanged to the reference element.
        let reference = Self::reference();
        let (_, xi) = TET_FACES
            .iter()
            .map(|&[i, j, k]| {
                let [u, v, w] = closest_point_on_triangle(p, [&self.vertices[i], &self.vertices[j], &self.vertices[k]]);
                let combine = |x: &[Point3<T>; 4]| Point3::from(x[i].coords * u + x[j].coords * v + x[k].coords * w);
                (distance_squared(&combine(&self.vertices), p), combine(&reference.vertices))
            })
            .min_by(|(d1, _), (d2, _)| d1.partial_cmp(d2).unwrap_or(Ordering::Less))
            .unwrap_or((0.0, Point3::origin()));
        ClosestPoint::ClosestPoint(xi)
    }
}

/// A quadratic Tet10 element, see [`Tet10Connectivity`] for the node ordering.
///
/// The geometry is taken from the four corner vertices only, so the element map is affine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tet10Element<T: Scalar> {
    tet4: Tet4Element<T>,
    vertices: [Point3<T>; 10],
}

impl<T: Scalar> Tet10Element<T> {
    pub fn from_vertices(vertices: [Point3<T>; 10]) -> Self {
        let corners = [0, 1, 2, 3].map(|i| vertices[i].clone());
        Self {
            tet4: Tet4Element::from_vertices(corners),
            vertices,
        }
    }

    pub fn vertices(&self) -> &[Point3<T>; 10] {
        &self.vertices
    }
}

/// Places the edge nodes at the edge midpoints.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> From<&Tet4Element<T>> for Tet10Element<T> {
    fn from(tet4: &Tet4Element<T>) -> Self {
        let corners = tet4.vertices();
        let mut vertices = [Point3::origin(); 10];
        vertices[..4].copy_from_slice(corners);
        for (node, &[a, b]) in vertices[4..].iter_mut().zip(&TET10_EDGES) {
            *node = Point3::from((corners[a].coords + corners[b].coords) * 0.5);
        }
        Tet10Element::from_vertices(vertices)
    }
}

impl<T: Real> Tet10Element<T> {
    pub fn reference() -> Self {
        Self::from(&Tet4Element::reference())
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> FixedNodesReferenceFiniteElement<T> for Tet10Element<T> {
    type NodalDim = U10;

    /// Quadratic functions of the barycentric coordinates $\lambda$: $\lambda_i (2 \lambda_i - 1)$
    /// at the corners and $4 \lambda_a \lambda_b$ on the edges.
    fn evaluate_basis(&self, xi: &Point3<T>) -> OMatrix<T, U1, U10> {
        let lambda = self.tet4.evaluate_basis(xi);
        let mut phi = OMatrix::<T, U1, U10>::zeros();
        for i in 0..4 {
            phi[i] = lambda[i] * (2.0 * lambda[i] - 1.0);
        }
        for (e, &[a, b]) in TET10_EDGES.iter().enumerate() {
            phi[4 + e] = 4.0 * lambda[a] * lambda[b];
        }
        phi
    }

    fn gradients(&self, xi: &Point3<T>) -> OMatrix<T, U3, U10> {
        let lambda = self.tet4.evaluate_basis(xi);
        let g = self.tet4.gradients(xi);
        let mut gradients = OMatrix::<T, U3, U10>::zeros();
        for i in 0..4 {
            gradients.set_column(i, &(g.column(i) * (4.0 * lambda[i] - 1.0)));
        }
        for (e, &[a, b]) in TET10_EDGES.iter().enumerate() {
            let grad = g.column(a) * (4.0 * lambda[b]) + g.column(b) * (4.0 * lambda[a]);
            gradients.set_column(4 + e, &grad);
        }
        gradients
    }
}

impl<T: Real> FiniteElement<T> for Tet10Element<T> {
    fn reference_jacobian(&self, xi: &Point3<T>) -> Matrix3<T> {
        self.tet4.reference_jacobian(xi)
    }

    fn map_reference_coords(&self, xi: &Point3<T>) -> Point3<T> {
        self.tet4.map_reference_coords(xi)
    }

    fn diameter(&self) -> T {
        self.tet4.diameter()
    }
}

impl<T: Real> BoundsForElement<T> for Tet10Element<T> {
    fn element_bounds(&self) -> AxisAlignedBoundingBox<T> {
        self.tet4.element_bounds()
    }
}

impl<T: Real> ClosestPointInElement<T> for Tet10Element<T> {
    fn closest_point(&self, p: &Point3<T>) -> ClosestPoint<T> {
        self.tet4.closest_point(p)
    }
}
