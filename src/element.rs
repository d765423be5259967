//! Finite elements on the reference tetrahedron.
//!
//! All elements share the reference tetrahedron with vertices
//! $(-1, -1, -1)$, $(1, -1, -1)$, $(-1, 1, -1)$ and $(-1, -1, 1)$, so reference quadrature
//! weights sum to $4/3$.
use crate::connectivity::Connectivity;
use crate::geometry::AxisAlignedBoundingBox;
use crate::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Matrix3, Matrix3xX, OMatrix, Point3, Scalar, U1, U3};

mod tetrahedron;

pub use tetrahedron::*;

/// A finite element described on a reference domain, independent of its physical geometry.
pub trait ReferenceFiniteElement<T: Real> {
    fn num_nodes(&self) -> usize;

    /// Evaluates every basis function of the element at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the buffer length is not equal to the number of nodes.
    fn populate_basis(&self, basis_values: &mut [T], reference_coords: &Point3<T>);

    /// Evaluates the gradients of every basis function with respect to reference coordinates.
    ///
    /// Column `I` of the output holds the gradient of the basis function of node `I`.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns is not equal to the number of nodes.
    fn populate_basis_gradients(&self, basis_gradients: &mut Matrix3xX<T>, reference_coords: &Point3<T>);
}

/// A reference element with a number of nodes known at compile time.
pub trait FixedNodesReferenceFiniteElement<T>
where
    T: Real,
    DefaultAllocator: Allocator<T, U1, Self::NodalDim> + Allocator<T, U3, Self::NodalDim>,
{
    type NodalDim: DimName;

    /// Evaluates each basis function at the given reference coordinates, as a row vector.
    fn evaluate_basis(&self, reference_coords: &Point3<T>) -> OMatrix<T, U1, Self::NodalDim>;

    /// Columns are the reference gradients of each basis function.
    fn gradients(&self, reference_coords: &Point3<T>) -> OMatrix<T, U3, Self::NodalDim>;
}

impl<T, Element> ReferenceFiniteElement<T> for Element
where
    T: Real,
    Element: FixedNodesReferenceFiniteElement<T>,
    DefaultAllocator: Allocator<T, U1, Element::NodalDim> + Allocator<T, U3, Element::NodalDim>,
{
    fn num_nodes(&self) -> usize {
        Element::NodalDim::dim()
    }

    fn populate_basis(&self, basis_values: &mut [T], reference_coords: &Point3<T>) {
        let values = self.evaluate_basis(reference_coords);
        basis_values.copy_from_slice(values.as_slice());
    }

    fn populate_basis_gradients(&self, basis_gradients: &mut Matrix3xX<T>, reference_coords: &Point3<T>) {
        assert_eq!(
            basis_gradients.ncols(),
            Element::NodalDim::dim(),
            "Gradient buffer must have one column per node"
        );
        let gradients = self.gradients(reference_coords);
        basis_gradients.copy_from(&gradients);
    }
}

/// A finite element with a physical geometry.
pub trait FiniteElement<T: Real>: ReferenceFiniteElement<T> {
    /// The Jacobian of the map from reference to physical coordinates.
    fn reference_jacobian(&self, reference_coords: &Point3<T>) -> Matrix3<T>;

    fn map_reference_coords(&self, reference_coords: &Point3<T>) -> Point3<T>;

    /// The largest distance between any two points in the element.
    fn diameter(&self) -> T;
}

/// The result of a closest point query, in reference coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClosestPoint<T: Scalar> {
    /// The query point lies inside the element.
    InElement(Point3<T>),
    /// The query point lies outside the element, and this is the closest point on its boundary.
    ClosestPoint(Point3<T>),
}

impl<T: Scalar> ClosestPoint<T> {
    pub fn point(&self) -> &Point3<T> {
        match self {
            Self::InElement(xi) => xi,
            Self::ClosestPoint(xi) => xi,
        }
    }

    pub fn is_in_element(&self) -> bool {
        matches!(self, Self::InElement(_))
    }
}

pub trait ClosestPointInElement<T: Real>: FiniteElement<T> {
    fn closest_point(&self, p: &Point3<T>) -> ClosestPoint<T>;
}

pub trait BoundsForElement<T: Real> {
    fn element_bounds(&self) -> AxisAlignedBoundingBox<T>;
}

/// Connectivity that can produce a physical finite element from mesh vertices.
pub trait ElementConnectivity<T: Real>: Connectivity {
    type Element: ClosestPointInElement<T> + BoundsForElement<T>;

    /// Returns `None` if any of the connectivity indices is out of bounds.
    fn element(&self, vertices: &[Point3<T>]) -> Option<Self::Element>;
}
