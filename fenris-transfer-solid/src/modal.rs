//! Low-frequency vibration modes of elastic bodies.
use crate::{assemble_rest_pose_hessian, HyperelasticMaterial};
use fenris_transfer::assembly::assemble_mass_matrix;
use fenris_transfer::eigen::{EigenTarget, EigensolveError, SymmetricEigensolver};
use fenris_transfer::element::ElementConnectivity;
use fenris_transfer::mesh::Mesh;
use fenris_transfer::nalgebra::{DMatrix, DVector};
use fenris_transfer::quadrature::QuadratureError;
use fenris_transfer::TransferError;
use log::{debug, warn};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Default shift for [`compute_modal_basis`].
///
/// Slightly negative, so that the rigid modes with zero eigenvalue are found without making
/// the shifted Hessian singular.
pub const DEFAULT_MODAL_SHIFT: f64 = -1e-5;

/// Vibration modes together with their angular frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalBasis {
    pub frequencies: DVector<f64>,
    /// One mode per column, as an interleaved 3D displacement field with unit Euclidean norm.
    pub modes: DMatrix<f64>,
}

impl ModalBasis {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn mode(&self, index: usize) -> Option<DVector<f64>> {
        (index < self.len()).then(|| self.modes.column(index).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalError {
    InvalidDensity(f64),
    /// Assembly of the elastic Hessian failed.
    Assembly(TransferError),
    /// Assembly of the mass matrix failed.
    Quadrature(QuadratureError),
    Eigensolve(EigensolveError),
}

impl Display for ModalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDensity(density) => write!(f, "density must be positive, got {density}"),
            Self::Assembly(_) => write!(f, "failed to assemble the elastic Hessian"),
            Self::Quadrature(_) => write!(f, "failed to assemble the mass matrix"),
            Self::Eigensolve(_) => write!(f, "failed to compute vibration modes"),
        }
    }
}

impl Error for ModalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDensity(_) => None,
            Self::Assembly(err) => Some(err),
            Self::Quadrature(err) => Some(err),
            Self::Eigensolve(err) => Some(err),
        }
    }
}

impl From<TransferError> for ModalError {
    fn from(err: TransferError) -> Self {
        Self::Assembly(err)
    }
}

impl From<QuadratureError> for ModalError {
    fn from(err: QuadratureError) -> Self {
        Self::Quadrature(err)
    }
}

impl From<EigensolveError> for ModalError {
    fn from(err: EigensolveError) -> Self {
        Self::Eigensolve(err)
    }
}

/// Computes `count` vibration modes of the mesh from the generalized eigenproblem
/// $H v = \lambda M v$, where $H$ is the rest-pose Hessian and $M$ the consistent mass matrix.
///
/// Eigenpairs are computed nearest `shift` and returned in the order of the eigensolver.
/// Modes are normalized to unit Euclidean norm and frequencies are $\sqrt{\max(\lambda, 0)}$.
pub fn compute_modal_basis<C, M>(
    mesh: &Mesh<f64, C>,
    density: f64,
    material: &M,
    parameters: &M::Parameters,
    count: usize,
    shift: f64,
    solver: &dyn SymmetricEigensolver,
) -> Result<ModalBasis, ModalError>
where
    C: ElementConnectivity<f64>,
    M: HyperelasticMaterial<f64>,
{
    if !(density.is_finite() && density > 0.0) {
        return Err(ModalError::InvalidDensity(density));
    }

    let hessian = assemble_rest_pose_hessian(mesh, material, parameters)?;
    let mass = assemble_mass_matrix(mesh, density, 3)?;
    let decomposition = solver.solve(&hessian, Some(&mass), count, EigenTarget::NearShift(shift))?;

    let mut modes = decomposition.eigenvectors;
    for mut mode in modes.column_iter_mut() {
        let norm = mode.norm();
        if norm > 0.0 {
            mode /= norm;
        }
    }

    // Rigid modes come out with eigenvalues that are zero up to round-off
    let num_negative = decomposition.eigenvalues.iter().filter(|&&lambda| lambda < 0.0).count();
    if num_negative > 0 {
        debug!("Clamping {num_negative} negative eigenvalues of the rest-pose Hessian to zero");
    }
    if decomposition.eigenvalues.iter().any(|lambda| lambda.is_nan()) {
        warn!("Rest-pose Hessian has NaN eigenvalues, reporting zero frequency for them");
    }
    let frequencies = decomposition.eigenvalues.map(|lambda| lambda.max(0.0).sqrt());
    debug!("Computed {} vibration modes", frequencies.len());

    Ok(ModalBasis { frequencies, modes })
}
