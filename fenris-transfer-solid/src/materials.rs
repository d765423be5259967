use crate::HyperelasticMaterial;
use fenris_transfer::nalgebra::{Matrix3, Vector3};
use fenris_transfer::Real;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// Lamé parameters $\mu$ (shear modulus) and $\lambda$.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LameParameters<T> {
    pub mu: T,
    pub lambda: T,
}

impl<T: Real> Default for LameParameters<T> {
    fn default() -> Self {
        YoungPoisson::default().into()
    }
}

/// Young's modulus and Poisson's ratio, convertible into [`LameParameters`].
///
/// Defaults to a soft material with $E = 10^3$ and $\nu = 0.3$.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungPoisson<T> {
    pub young: T,
    pub poisson: T,
}

impl<T: Real> Default for YoungPoisson<T> {
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn default() -> Self {
        Self {
            young: 1e3,
            poisson: 0.3,
        }
    }
}

impl<T: Real> From<YoungPoisson<T>> for LameParameters<T> {
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn from(params: YoungPoisson<T>) -> Self {
        let YoungPoisson { young, poisson } = params;
        let mu = 0.5 * young / (1.0 + poisson);
        let lambda = 2.0 * mu * poisson / (1.0 - 2.0 * poisson);
        Self { mu, lambda }
    }
}

/// Linear elasticity, written in terms of $\vec F = \vec I + \nabla u$.
///
/// With the small strain $\vec \epsilon = \operatorname{sym}(\vec F) - \vec I$:
/// $$
/// \psi = \mu \, \vec \epsilon : \vec \epsilon + \tfrac{\lambda}{2} (\operatorname{tr} \vec \epsilon)^2,
/// \qquad
/// \vec P = 2 \mu \vec \epsilon + \lambda (\operatorname{tr} \vec \epsilon) \vec I.
/// $$
/// The contraction $\mu [(\vec a \cdot \vec b) \vec I + \vec b \vec a^T] + \lambda \vec a \vec b^T$
/// is constant in $\vec F$, so the elastic Hessian does not depend on the displacement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearElasticMaterial;

fn infinitesimal_strain_tensor<T: Real>(deformation_gradient: &Matrix3<T>) -> Matrix3<T> {
    deformation_gradient.symmetric_part() - Matrix3::identity()
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> HyperelasticMaterial<T> for LinearElasticMaterial {
    type Parameters = LameParameters<T>;

    fn compute_energy_density(&self, deformation_gradient: &Matrix3<T>, parameters: &Self::Parameters) -> T {
        let &LameParameters { mu, lambda } = parameters;
        let eps = infinitesimal_strain_tensor(deformation_gradient);
        mu * eps.dot(&eps) + 0.5 * lambda * eps.trace().powi(2)
    }

    fn compute_stress_tensor(&self, deformation_gradient: &Matrix3<T>, parameters: &Self::Parameters) -> Matrix3<T> {
        let &LameParameters { mu, lambda } = parameters;
        let eps = infinitesimal_strain_tensor(deformation_gradient);
        eps * (2.0 * mu) + Matrix3::identity() * (lambda * eps.trace())
    }

    fn compute_stress_contraction(
        &self,
        _deformation_gradient: &Matrix3<T>,
        a: &Vector3<T>,
        b: &Vector3<T>,
        parameters: &Self::Parameters,
    ) -> Matrix3<T> {
        let &LameParameters { mu, lambda } = parameters;
        let shear = Matrix3::from_diagonal_element(a.dot(b)) + b * a.transpose();
        shear * mu + a * b.transpose() * lambda
    }
}

/// Saint Venant-Kirchhoff: linear elasticity applied to the Green strain
/// $\vec E = \frac{1}{2}(\vec F^T \vec F - \vec I)$, i.e.
/// $\psi = \mu \, \vec E : \vec E + \tfrac{\lambda}{2} (\operatorname{tr} \vec E)^2$ and
/// $\vec P = \vec F \vec S$ with $\vec S = 2 \mu \vec E + \lambda (\operatorname{tr} \vec E) \vec I$.
///
/// Rotation invariant, but softens and eventually collapses under strong compression.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StVKMaterial;

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
fn green_strain_tensor<T: Real>(deformation_gradient: &Matrix3<T>) -> Matrix3<T> {
    let F = deformation_gradient;
    (F.transpose() * F - Matrix3::identity()) * 0.5
}

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> HyperelasticMaterial<T> for StVKMaterial {
    type Parameters = LameParameters<T>;

    fn compute_energy_density(&self, deformation_gradient: &Matrix3<T>, parameters: &Self::Parameters) -> T {
        let &LameParameters { mu, lambda } = parameters;
        let E = green_strain_tensor(deformation_gradient);
        mu * E.dot(&E) + 0.5 * lambda * E.trace().powi(2)
    }

    fn compute_stress_tensor(&self, deformation_gradient: &Matrix3<T>, parameters: &Self::Parameters) -> Matrix3<T> {
        let &LameParameters { mu, lambda } = parameters;
        let F = deformation_gradient;
        let E = green_strain_tensor(F);
        let S = E * (2.0 * mu) + Matrix3::identity() * (lambda * E.trace());
        F * S
    }

    fn compute_stress_contraction(
        &self,
        deformation_gradient: &Matrix3<T>,
        a: &Vector3<T>,
        b: &Vector3<T>,
        parameters: &Self::Parameters,
    ) -> Matrix3<T> {
        let &LameParameters { mu, lambda } = parameters;
        let F = deformation_gradient;
        let E = green_strain_tensor(F);
        let a_dot_b = a.dot(b);
        let (Fa, Fb) = (F * a, F * b);

        // Geometric stiffness a^T S b on the diagonal, then the material terms
        let geometric = 2.0 * mu * a.dot(&(E * b)) + lambda * E.trace() * a_dot_b;
        Matrix3::from_diagonal_element(geometric)
            + Fb * Fa.transpose() * mu
            + Fa * Fb.transpose() * lambda
            + F * F.transpose() * (mu * a_dot_b)
    }
}

/// The stable Neo-Hookean material model of Smith et al. (2018).
///
/// The strain energy density is
/// $$
/// \psi(\vec F) = \frac{\mu}{2}(I_C - 3) + \frac{\lambda}{2}(J - \alpha)^2,
/// \qquad \alpha = 1 + \frac{\mu}{\lambda},
/// $$
/// where $J = \det \vec F$ and $I_C = \operatorname{tr}(\vec F^T \vec F)$. Unlike the classical
/// Neo-Hookean model, the energy is defined for inverted elements ($J \leq 0$). The stress is
/// $$
/// \vec P(\vec F) = \mu \vec F + \lambda (J - \alpha) \frac{\partial J}{\partial \vec F}
/// $$
/// and the contraction operator is
/// $$
/// \mathcal{C}_{\vec P}(\vec F, \vec a, \vec b) =
///     \mu (\vec a \cdot \vec b) \vec I
///     + \lambda (\vec G \vec a)(\vec G \vec b)^T
///     - \lambda (J - \alpha) \left[ \vec F (\vec a \times \vec b) \right]_\times,
/// $$
/// with $\vec G = \partial J / \partial \vec F$ and $[\vec w]_\times$ the cross product matrix of $\vec w$.
///
/// The parameter $\lambda$ must be positive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableNeoHookeanMaterial;

/// The derivative of $\det \vec F$ with respect to $\vec F$, i.e. the cofactor matrix.
#[allow(non_snake_case)]
fn determinant_gradient<T: Real>(F: &Matrix3<T>) -> Matrix3<T> {
    let f0 = F.column(0);
    let f1 = F.column(1);
    let f2 = F.column(2);
    Matrix3::from_columns(&[f1.cross(&f2), f2.cross(&f0), f0.cross(&f1)])
}

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> HyperelasticMaterial<T> for StableNeoHookeanMaterial {
    type Parameters = LameParameters<T>;

    fn compute_energy_density(&self, deformation_gradient: &Matrix3<T>, parameters: &Self::Parameters) -> T {
        let &LameParameters { mu, lambda } = parameters;
        let F = deformation_gradient;
        let alpha = 1.0 + mu / lambda;
        let I_C = F.norm_squared();
        0.5 * mu * (I_C - 3.0) + 0.5 * lambda * (F.determinant() - alpha).powi(2)
    }

    fn compute_stress_tensor(&self, deformation_gradient: &Matrix3<T>, parameters: &Self::Parameters) -> Matrix3<T> {
        let &LameParameters { mu, lambda } = parameters;
        let F = deformation_gradient;
        let alpha = 1.0 + mu / lambda;
        F * mu + determinant_gradient(F) * (lambda * (F.determinant() - alpha))
    }

    fn compute_stress_contraction(
        &self,
        deformation_gradient: &Matrix3<T>,
        a: &Vector3<T>,
        b: &Vector3<T>,
        parameters: &Self::Parameters,
    ) -> Matrix3<T> {
        let &LameParameters { mu, lambda } = parameters;
        let F = deformation_gradient;
        let alpha = 1.0 + mu / lambda;
        let G = determinant_gradient(F);
        let Ga = G * a;
        let Gb = G * b;
        let w = F * a.cross(b);

        Matrix3::identity() * (mu * a.dot(b)) + Ga * Gb.transpose() * lambda
            - w.cross_matrix() * (lambda * (F.determinant() - alpha))
    }
}
