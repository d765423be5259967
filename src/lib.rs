//! Transfer of finite element fields between non-nested tetrahedral meshes.
//!
//! Given a *source* mesh carrying a field, a *target* mesh (typically a coarse cage) and a
//! *domain* mesh supplying the integration measure, this crate assembles the cross-mesh
//! Galerkin ($L^2$) projection
//!
//! $$
//! A u_T = P u_S, \qquad A = N_T^T W N_T, \quad P = N_T^T W N_S,
//! $$
//!
//! regularizes it with smoothing and elastic energies and provides two strategies for
//! (approximately) inverting it: a sparse Cholesky factorization
//! ([`CholeskyTransferOperator`](transfer::CholeskyTransferOperator)) and a truncated eigenbasis
//! ([`LowRankTransferOperator`](transfer::LowRankTransferOperator)).
//!
//! Elastic energies and modal bases live in the companion crate `fenris-transfer-solid`.
use nalgebra::RealField;

pub mod animation;
pub mod assembly;
pub mod connectivity;
pub mod eigen;
pub mod element;
pub mod error;
pub mod galerkin;
pub mod geometry;
pub mod mesh;
pub mod quadrature;
pub mod regularization;
pub mod sampling;
pub mod space;
pub mod sparse;
pub mod transfer;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

pub use error::TransferError;

/// Real scalar types supported by the geometric parts of the crate.
///
/// The linear algebra pipeline (assembly, eigensolvers, transfer operators) works in `f64`.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
