//! Synthetic deformations for exercising transfer operators.
//!
//! A frame combines an oscillating vibration mode with a rigid rotation of the model about
//! its centroid. The resulting displacement is what a caller transfers onto a cage.
use crate::error::{check_shape, TransferError};
use nalgebra::{DMatrix, DVector, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The displacement $c \sin(k \omega t) v$ of a vibration mode $v$ with angular frequency $\omega$.
pub fn modal_signal(frequency: f64, mode: &DVector<f64>, t: f64, amplitude: f64, wave_frequency: f64) -> DVector<f64> {
    mode * (amplitude * (wave_frequency * frequency * t).sin())
}

/// Interactive demo state, advanced once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationState {
    /// Index of the displayed vibration mode.
    pub mode: usize,
    pub amplitude: f64,
    pub wave_frequency: f64,
    /// Current rotation angle about the y axis.
    pub theta: f64,
    /// Rotation increment per frame.
    pub dtheta: f64,
    /// Uniform offset added to every component of the transferred displacement.
    pub translation: f64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            mode: 6,
            amplitude: 0.15,
            wave_frequency: 0.05,
            theta: 0.0,
            dtheta: PI / 120.0,
            translation: 1.0,
        }
    }
}

/// Displacements produced for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    /// Displacement of the model: vibration plus rigid rotation.
    pub displacement: DVector<f64>,
    /// The field to transfer onto the cage: the model displacement plus the uniform translation.
    pub transfer_input: DVector<f64>,
}

impl AnimationState {
    /// Advances the rotation angle, wrapping back to zero after a full turn.
    pub fn advance(&mut self) {
        self.theta += self.dtheta;
        if self.theta > 2.0 * PI {
            self.theta = 0.0;
        }
    }

    /// Computes the displacements of the current frame at time `t`.
    ///
    /// `modes` holds one vibration mode per column (interleaved 3D displacements of the rest
    /// positions) with the angular frequencies in `frequencies`.
    pub fn frame(
        &self,
        rest_positions: &[Point3<f64>],
        frequencies: &[f64],
        modes: &DMatrix<f64>,
        t: f64,
    ) -> Result<AnimationFrame, TransferError> {
        let num_dofs = 3 * rest_positions.len();
        check_shape("vibration modes", (num_dofs, frequencies.len()), (modes.nrows(), modes.ncols()))?;
        if self.mode >= frequencies.len() {
            return Err(TransferError::InvalidSettings(format!(
                "mode index {} out of range for {} modes",
                self.mode,
                frequencies.len()
            )));
        }

        let mode = modes.column(self.mode).into_owned();
        let vibration = modal_signal(frequencies[self.mode], &mode, t, self.amplitude, self.wave_frequency);
        let rotation = self.rigid_rotation(rest_positions);
        let displacement = vibration + rotation;
        let transfer_input = displacement.add_scalar(self.translation);
        Ok(AnimationFrame {
            displacement,
            transfer_input,
        })
    }

    /// Displacement rotating the points by `theta` about the y axis through their centroid.
    fn rigid_rotation(&self, rest_positions: &[Point3<f64>]) -> DVector<f64> {
        let mut displacement = DVector::zeros(3 * rest_positions.len());
        if rest_positions.is_empty() {
            return displacement;
        }
        let centroid = rest_positions
            .iter()
            .fold(Vector3::zeros(), |sum, x| sum + x.coords)
            / rest_positions.len() as f64;
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), self.theta);
        for (i, x) in rest_positions.iter().enumerate() {
            let rotated = rotation * (x.coords - centroid) + centroid;
            displacement
                .fixed_rows_mut::<3>(3 * i)
                .copy_from(&(rotated - x.coords));
        }
        displacement
    }
}

/// Applies an interleaved 3D displacement to rest positions.
pub fn deform(rest_positions: &[Point3<f64>], displacement: &DVector<f64>) -> Result<Vec<Point3<f64>>, TransferError> {
    check_shape(
        "displacement",
        (3 * rest_positions.len(), 1),
        (displacement.len(), 1),
    )?;
    Ok(rest_positions
        .iter()
        .enumerate()
        .map(|(i, x)| x + displacement.fixed_rows::<3>(3 * i).into_owned())
        .collect())
}
