//! Small helpers on top of `nalgebra-sparse`.
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Computes $M \otimes I_d$, so that entry $(i, j)$ of `m` is replicated to
/// $(d i + k, d j + k)$ for $k = 0, \dots, d - 1$.
pub fn kronecker_with_identity(m: &CsrMatrix<f64>, dim: usize) -> CsrMatrix<f64> {
    if dim == 1 {
        return m.clone();
    }
    let mut coo = CooMatrix::new(dim * m.nrows(), dim * m.ncols());
    for (i, j, &v) in m.triplet_iter() {
        for k in 0..dim {
            coo.push(dim * i + k, dim * j + k, v);
        }
    }
    CsrMatrix::from(&coo)
}

pub fn diagonal_matrix(diagonal: &DVector<f64>) -> CsrMatrix<f64> {
    let n = diagonal.len();
    let mut coo = CooMatrix::new(n, n);
    for (i, &d) in diagonal.iter().enumerate() {
        coo.push(i, i, d);
    }
    CsrMatrix::from(&coo)
}

/// Returns the diagonal of a square matrix, with zeros for missing entries.
pub fn diagonal_of(m: &CsrMatrix<f64>) -> DVector<f64> {
    let mut diagonal = DVector::zeros(m.nrows().min(m.ncols()));
    for (i, j, &v) in m.triplet_iter() {
        if i == j {
            diagonal[i] += v;
        }
    }
    diagonal
}

/// Computes $M + \tau I$ for a square matrix.
pub fn add_scaled_identity(m: &CsrMatrix<f64>, tau: f64) -> CsrMatrix<f64> {
    if tau == 0.0 {
        return m.clone();
    }
    let identity = CsrMatrix::<f64>::identity(m.nrows()) * tau;
    m + &identity
}

pub fn to_dense(m: &CsrMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from(m)
}

/// The largest absolute difference between `m` and its transpose.
pub fn symmetry_defect(m: &CsrMatrix<f64>) -> f64 {
    let difference = m - &m.transpose();
    difference
        .values()
        .iter()
        .fold(0.0, |max, v| f64::max(max, v.abs()))
}
