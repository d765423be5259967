//! Solid mechanics functionality for `fenris-transfer`.
//!
//! Provides hyperelastic material models, assembly of their Hessians on tetrahedral meshes and
//! low-frequency vibration modes computed from the rest-pose Hessian. The Hessian serves as the
//! elastic regularization term of transfer operators, the modes as test and demo fields.
use fenris_transfer::nalgebra::{Matrix3, Vector3};
use fenris_transfer::Real;

pub mod hessian;
pub mod materials;
pub mod modal;

pub use hessian::*;
pub use modal::*;

pub trait HyperelasticMaterial<T: Real> {
    type Parameters: Clone + Default + 'static;

    /// Compute the energy density $\psi = \psi(\vec F)$ associated with the material.
    fn compute_energy_density(&self, deformation_gradient: &Matrix3<T>, parameters: &Self::Parameters) -> T;

    /// Compute the First Piola-Kirchhoff stress tensor $\vec P = \vec P(\vec F)$.
    fn compute_stress_tensor(&self, deformation_gradient: &Matrix3<T>, parameters: &Self::Parameters) -> Matrix3<T>;

    /// Compute the stress contraction operator $\mathcal{C}_{\vec P}(\vec F, \vec a, \vec b)$ with the given
    /// material parameters.
    ///
    /// The contraction operator is defined by
    /// $$
    /// \mathcal{C}_{\vec P} (\vec F, \vec a, \vec b)
    ///     := a_k \frac{\partial P_{ik}}{\partial F_{jm}} (\vec F) \, b_m \enspace \vec e_i \otimes \vec e_j.
    /// $$
    /// With $\vec a$ and $\vec b$ the gradients of two basis functions, this is the corresponding
    /// $3 \times 3$ block of the Hessian of the elastic energy.
    fn compute_stress_contraction(
        &self,
        deformation_gradient: &Matrix3<T>,
        a: &Vector3<T>,
        b: &Vector3<T>,
        parameters: &Self::Parameters,
    ) -> Matrix3<T>;
}
