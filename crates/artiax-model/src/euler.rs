//! Euler angle conventions.
//!
//! A convention fixes three rotation axes. Angles are in degrees; the
//! trigonometry runs in radians.

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }

    /// Right-handed rotation by `degrees` about this axis.
    pub fn rotation(self, degrees: f64) -> Matrix3<f64> {
        Rotation3::from_axis_angle(&self.unit(), degrees.to_radians()).into_inner()
    }
}

/// Conversion between a rotation matrix and three stored angles.
///
/// Implementors supply the axes and the three extraction rules. The provided
/// `matrix_from_angles` applies angle 1 first, then angle 2, then angle 3:
///
/// `R = R(axis3, a3) · R(axis2, a2) · R(axis1, a1)`
///
/// The extraction rules must invert that product for every matrix away from
/// the convention's gimbal-lock configuration. At gimbal lock angle 1 is 0 and
/// angle 3 carries the combined in-plane rotation.
pub trait EulerConvention {
    fn axes(&self) -> [Axis; 3];

    /// Angle 1 in degrees.
    fn rot1_from_matrix(&self, matrix: &Matrix3<f64>) -> f64;

    /// Angle 2 in degrees.
    fn rot2_from_matrix(&self, matrix: &Matrix3<f64>) -> f64;

    /// Angle 3 in degrees.
    fn rot3_from_matrix(&self, matrix: &Matrix3<f64>) -> f64;

    fn matrix_from_angles(&self, angle1: f64, angle2: f64, angle3: f64) -> Matrix3<f64> {
        let [axis1, axis2, axis3] = self.axes();
        axis3.rotation(angle3) * axis2.rotation(angle2) * axis1.rotation(angle1)
    }

    fn angles_from_matrix(&self, matrix: &Matrix3<f64>) -> [f64; 3] {
        [
            self.rot1_from_matrix(matrix),
            self.rot2_from_matrix(matrix),
            self.rot3_from_matrix(matrix),
        ]
    }
}

/// Clamps a matrix entry into `[-1, 1]` before it reaches `acos`/`sqrt`.
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}
