//! Accelerated point location in tetrahedral meshes.
use crate::element::{BoundsForElement, ClosestPoint, ClosestPointInElement, ElementConnectivity, FiniteElement};
use crate::geometry::AxisAlignedBoundingBox;
use crate::mesh::Mesh;
use crate::Real;
use log::debug;
use nalgebra::{distance, Point3, Scalar};
use numeric_literals::replace_float_literals;
use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// An element bounding box stored in the R-tree, always in double precision.
#[derive(Debug, Clone, PartialEq)]
struct RTreeAABB(AxisAlignedBoundingBox<f64>);

impl RTreeObject for RTreeAABB {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        let Self(aabb) = self;
        AABB::from_corners(aabb.min().coords.into(), aabb.max().coords.into())
    }
}

impl PointDistance for RTreeAABB {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        self.0.dist2_to(&Point3::from(*point))
    }

    fn contains_point(&self, point: &[f64; 3]) -> bool {
        self.0.contains_point(&Point3::from(*point))
    }
}

fn point_to_f64<T: Real>(point: &Point3<T>) -> Option<Point3<f64>> {
    Some(Point3::new(
        point.x.to_subset()?,
        point.y.to_subset()?,
        point.z.to_subset()?,
    ))
}

struct RTreeAccelerationStructure {
    tree: RTree<GeomWithData<RTreeAABB, usize>>,
}

impl RTreeAccelerationStructure {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn from_bounding_boxes<T: Real>(boxes: &[AxisAlignedBoundingBox<T>]) -> Self {
        let geometries = boxes
            .iter()
            .enumerate()
            .filter_map(|(i, bounding_box)| {
                // Enlarge the box slightly to accommodate floating point errors
                let bounding_box = bounding_box.grow_uniformly(0.01 * bounding_box.max_extent());
                let box_min = point_to_f64(bounding_box.min())?;
                let box_max = point_to_f64(bounding_box.max())?;
                Some(GeomWithData::new(
                    RTreeAABB(AxisAlignedBoundingBox::new(box_min, box_max)),
                    i,
                ))
            })
            .collect();
        Self {
            tree: RTree::bulk_load(geometries),
        }
    }

    /// Indices of elements that may contain the point closest to the query point.
    fn closest_element_candidates<'a>(&'a self, point: &Point3<f64>) -> impl 'a + Iterator<Item = usize> {
        let point = *point;
        let query: [f64; 3] = point.coords.into();
        let mut iter = self
            .tree
            .nearest_neighbor_iter(&query)
            .map(|geom| (&geom.geom().0, geom.data))
            .peekable();

        // The maximum possible distance to any point in the nearest box
        let d2_max = iter
            .peek()
            .map(|(aabb, _)| aabb.max_dist2_to(&point))
            .unwrap_or(f64::NAN);
        iter
            // Any other box whose closest point lies further away than that can be excluded
            .take_while(move |&(aabb, _)| aabb.dist2_to(&point) <= d2_max)
            .map(|(_, index)| index)
    }
}

/// The element closest to a query point, and the reference coordinates of the
/// closest point in that element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLocation<T: Scalar> {
    pub element: usize,
    pub reference_coords: Point3<T>,
    /// Distance from the query point to the element (zero when contained).
    pub distance: T,
}

/// A mesh with an R-tree over the bounding boxes of its elements.
pub struct SpatiallyIndexed<'a, T: Scalar, C> {
    mesh: &'a Mesh<T, C>,
    tree: RTreeAccelerationStructure,
}

impl<'a, T, C> SpatiallyIndexed<'a, T, C>
where
    T: Real,
    C: ElementConnectivity<T>,
{
    pub fn from_mesh(mesh: &'a Mesh<T, C>) -> Self {
        let bounding_boxes: Vec<_> = mesh.elements().map(|e| e.element_bounds()).collect();
        let tree = RTreeAccelerationStructure::from_bounding_boxes(&bounding_boxes);
        debug!("Built R-tree over {} element bounding boxes", bounding_boxes.len());
        Self { mesh, tree }
    }

    pub fn mesh(&self) -> &'a Mesh<T, C> {
        self.mesh
    }

    /// Finds the element closest to the given point.
    ///
    /// The first candidate element that contains the point is returned. Otherwise the element
    /// whose boundary is closest to the point wins. Returns `None` only for empty meshes
    /// or non-finite points.
    pub fn find_closest_element_and_reference_coords(&self, point: &Point3<T>) -> Option<PointLocation<T>> {
        let point_f64 = point_to_f64(point)?;
        let mut closest: Option<PointLocation<T>> = None;
        for element_index in self.tree.closest_element_candidates(&point_f64) {
            let element = self.mesh.element(element_index)?;
            match element.closest_point(point) {
                ClosestPoint::InElement(xi) => {
                    return Some(PointLocation {
                        element: element_index,
                        reference_coords: xi,
                        distance: T::zero(),
                    });
                }
                ClosestPoint::ClosestPoint(xi) => {
                    let d = distance(&element.map_reference_coords(&xi), point);
                    if closest.map_or(true, |c| d < c.distance) {
                        closest = Some(PointLocation {
                            element: element_index,
                            reference_coords: xi,
                            distance: d,
                        });
                    }
                }
            }
        }
        closest
    }

    /// Locates every point, optionally in parallel.
    pub fn nearest_elements(&self, points: &[Point3<T>], parallel: bool) -> Vec<Option<PointLocation<T>>>
    where
        T: Send + Sync,
        C: Sync,
    {
        if parallel {
            points
                .par_iter()
                .map(|p| self.find_closest_element_and_reference_coords(p))
                .collect()
        } else {
            points
                .iter()
                .map(|p| self.find_closest_element_and_reference_coords(p))
                .collect()
        }
    }
}
