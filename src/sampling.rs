//! Point evaluation (shape function) matrices.
//!
//! A shape function matrix $N$ maps the nodal degrees of freedom of a field on a mesh to the
//! values of the field at a set of points, so that $N u$ samples the field.
use crate::element::{ElementConnectivity, ReferenceFiniteElement};
use crate::error::TransferError;
use crate::space::SpatiallyIndexed;
use log::{debug, warn};
use nalgebra::Point3;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use serde::{Deserialize, Serialize};

/// What to do with points that lie outside of every element of the sampled mesh.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutOfDomainPolicy {
    /// Evaluate the basis at the closest point of the nearest element.
    NearestElement,
    /// Leave the rows of the point empty, so that the sampled field vanishes there.
    Zero,
    /// Reject the point with [`TransferError::PointOutsideMesh`].
    Error,
}

impl Default for OutOfDomainPolicy {
    fn default() -> Self {
        Self::NearestElement
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    pub out_of_domain: OutOfDomainPolicy,
    /// Points further away from the mesh than this distance count as outside.
    pub containment_tolerance: f64,
    /// Locate points in parallel with rayon.
    pub parallel: bool,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            out_of_domain: OutOfDomainPolicy::default(),
            containment_tolerance: 1e-8,
            parallel: false,
        }
    }
}

/// Assembles the shape function matrix of the indexed mesh at the given points.
///
/// The result has dimensions `(points.len() * solution_dim) x (num_nodes * solution_dim)`.
/// Entry `(solution_dim * p + d, solution_dim * n + d)` holds the basis function of node `n`
/// evaluated at point `p`, for each component `d`.
pub fn shape_function_matrix<C>(
    space: &SpatiallyIndexed<'_, f64, C>,
    points: &[Point3<f64>],
    solution_dim: usize,
    options: &SamplingOptions,
) -> Result<CsrMatrix<f64>, TransferError>
where
    C: ElementConnectivity<f64> + Sync,
{
    if solution_dim == 0 {
        return Err(TransferError::InvalidSettings("solution dimension must be positive".to_string()));
    }
    let mesh = space.mesh();
    if mesh.is_empty() || mesh.num_nodes() == 0 {
        return Err(TransferError::EmptyMesh { role: "sampled" });
    }

    let s = solution_dim;
    let locations = space.nearest_elements(points, options.parallel);
    let mut coo = CooMatrix::new(s * points.len(), s * mesh.num_nodes());
    let mut basis = Vec::new();
    let mut num_outside = 0;

    for (point_index, location) in locations.into_iter().enumerate() {
        let distance = location.map_or(f64::INFINITY, |loc| loc.distance);
        let outside = distance > options.containment_tolerance;
        if outside {
            num_outside += 1;
            match options.out_of_domain {
                OutOfDomainPolicy::Zero => continue,
                OutOfDomainPolicy::Error => {
                    return Err(TransferError::PointOutsideMesh { point_index, distance });
                }
                OutOfDomainPolicy::NearestElement => {}
            }
        }

        let Some(location) = location else {
            return Err(TransferError::PointOutsideMesh { point_index, distance });
        };
        let conn = &mesh.connectivity()[location.element];
        let element = mesh
            .element(location.element)
            .ok_or(TransferError::EmptyMesh { role: "sampled" })?;
        basis.resize(element.num_nodes(), 0.0);
        element.populate_basis(&mut basis, &location.reference_coords);

        for (&node, &phi) in conn.vertex_indices().iter().zip(&basis) {
            for d in 0..s {
                coo.push(s * point_index + d, s * node + d, phi);
            }
        }
    }

    if num_outside > 0 {
        warn!(
            "{} of {} sample points lie outside the mesh (policy: {:?})",
            num_outside,
            points.len(),
            options.out_of_domain
        );
    }
    debug!("Sampled {} points on a mesh with {} nodes", points.len(), mesh.num_nodes());
    Ok(CsrMatrix::from(&coo))
}
