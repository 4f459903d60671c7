//! STOPGAP Euler convention: phi about Z, then the about X, then psi about Z.

use artiax_model::{Axis, EulerConvention, clamp_unit};
use nalgebra::Matrix3;

/// `m[2,2]` above this is treated as gimbal lock with `the` near zero.
const SINGULAR_COS: f64 = 0.9999;

/// `sin(the)` below this with `m[2,2] < 0` is an exact half-turn flip.
const FLIP_SIN: f64 = 16.0 * f32::EPSILON as f64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopgapRotation;

impl StopgapRotation {
    fn is_singular(matrix: &Matrix3<f64>) -> bool {
        matrix[(2, 2)] > SINGULAR_COS
    }

    fn is_flip(matrix: &Matrix3<f64>) -> bool {
        let c = clamp_unit(matrix[(2, 2)]);
        c < 0.0 && (1.0 - c * c).sqrt() < FLIP_SIN
    }
}

impl EulerConvention for StopgapRotation {
    fn axes(&self) -> [Axis; 3] {
        [Axis::Z, Axis::X, Axis::Z]
    }

    /// Phi. Zero at either pole, where psi carries the whole in-plane angle.
    fn rot1_from_matrix(&self, matrix: &Matrix3<f64>) -> f64 {
        if Self::is_singular(matrix) || Self::is_flip(matrix) {
            0.0
        } else {
            matrix[(2, 0)].atan2(matrix[(2, 1)]).to_degrees()
        }
    }

    /// The, in [0, 180].
    fn rot2_from_matrix(&self, matrix: &Matrix3<f64>) -> f64 {
        let c = clamp_unit(matrix[(2, 2)]);
        (1.0 - c * c).sqrt().atan2(c).to_degrees()
    }

    /// Psi.
    fn rot3_from_matrix(&self, matrix: &Matrix3<f64>) -> f64 {
        if Self::is_singular(matrix) {
            // sign(0) counts as negative so a half turn comes out as +180.
            let sign = if matrix[(0, 1)] > 0.0 { 1.0 } else { -1.0 };
            -sign * clamp_unit(matrix[(0, 0)]).acos().to_degrees()
        } else if Self::is_flip(matrix) {
            matrix[(1, 0)].atan2(matrix[(0, 0)]).to_degrees()
        } else {
            matrix[(0, 2)].atan2(-matrix[(1, 2)]).to_degrees()
        }
    }
}
