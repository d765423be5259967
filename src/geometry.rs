//! Small geometric primitives used for point location.
use crate::Real;
use nalgebra::{Point3, Scalar, Vector3};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct AxisAlignedBoundingBox<T: Scalar> {
    min: Point3<T>,
    max: Point3<T>,
}

impl<T: Real> AxisAlignedBoundingBox<T> {
    pub fn new(min: Point3<T>, max: Point3<T>) -> Self {
        for i in 0..3 {
            assert!(min[i] <= max[i], "min must not exceed max");
        }
        Self { min, max }
    }

    pub fn min(&self) -> &Point3<T> {
        &self.min
    }

    pub fn max(&self) -> &Point3<T> {
        &self.max
    }

    /// Computes the minimal bounding box which encloses both `self` and `other`.
    pub fn enclose(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<T>>) -> Option<Self> {
        let mut points = points.into_iter();
        points.next().map(|first| {
            points.fold(Self::new(*first, *first), |aabb, point| {
                aabb.enclose(&Self::new(*point, *point))
            })
        })
    }

    pub fn extents(&self) -> Vector3<T> {
        self.max - self.min
    }

    pub fn max_extent(&self) -> T {
        self.extents().amax()
    }

    /// Grows the bounding box by `distance` in all directions.
    pub fn grow_uniformly(&self, distance: T) -> Self {
        let offset = Vector3::repeat(distance);
        Self::new(self.min - offset, self.max + offset)
    }

    pub fn contains_point(&self, point: &Point3<T>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Squared distance from the point to the closest point in the box (zero if contained).
    pub fn dist2_to(&self, point: &Point3<T>) -> T {
        let mut dist2 = T::zero();
        for i in 0..3 {
            let d = if point[i] < self.min[i] {
                self.min[i] - point[i]
            } else if point[i] > self.max[i] {
                point[i] - self.max[i]
            } else {
                T::zero()
            };
            dist2 += d * d;
        }
        dist2
    }

    /// Squared distance from the point to the furthest point in the box.
    pub fn max_dist2_to(&self, point: &Point3<T>) -> T {
        let mut dist2 = T::zero();
        for i in 0..3 {
            let d = T::max((point[i] - self.min[i]).abs(), (point[i] - self.max[i]).abs());
            dist2 += d * d;
        }
        dist2
    }
}

/// Computes the barycentric coordinates of the point on the triangle `abc` closest to `p`.
///
/// Follows the Voronoi region classification of Ericson, *Real-Time Collision Detection*, 5.1.5.
#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).unwrap())]
pub fn closest_point_on_triangle<T: Real>(p: &Point3<T>, [a, b, c]: [&Point3<T>; 3]) -> [T; 3] {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return [1.0, 0.0, 0.0];
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return [0.0, 1.0, 0.0];
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return [1.0 - v, v, 0.0];
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return [0.0, 0.0, 1.0];
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return [1.0 - w, 0.0, w];
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return [0.0, 1.0 - w, w];
    }

    // Interior of the face
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    [1.0 - v - w, v, w]
}
