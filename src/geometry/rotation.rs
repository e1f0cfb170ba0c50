//! Conversions between rotation representations.
//!
//! Three encodings of the same rotation are supported:
//!
//! - [`Quaternion`] stored as (x, y, z, w)
//! - [`RotationMatrix`], a 3×3 orthonormal matrix with det = +1
//! - [`EulerAngles`] (roll, pitch, yaw) with R = Rz(yaw) · Ry(pitch) · Rx(roll)
//!
//! Inputs are validated against the tolerances of a [`ConverterConfig`]
//! unless `validate_inputs` is off, in which case the closed-form kernels run
//! on whatever they are given.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Matrix3, Rotation3};
use tracing::debug;

use crate::error::{Result, RotationError};
use crate::io::config::{ConverterConfig, DegeneratePolicy};

/// 3×3 rotation matrix, indexed `m[(row, col)]`.
pub type RotationMatrix = Matrix3<f64>;

/// Rotation quaternion in (x, y, z, w) order.
///
/// `q` and `-q` encode the same rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn normalized(&self) -> Self {
        let n = self.norm();
        Self::new(self.x / n, self.y / n, self.z / n, self.w / n)
    }

    pub fn negated(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// True if both quaternions encode the same rotation, i.e. they match
    /// component-wise within `tolerance` up to an overall sign.
    pub fn same_rotation(&self, other: &Quaternion, tolerance: f64) -> bool {
        let direct = [
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        ];
        let flipped = [
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        ];
        direct.iter().all(|d| d.abs() <= tolerance) || flipped.iter().all(|d| d.abs() <= tolerance)
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from([x, y, z, w]: [f64; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(q: Quaternion) -> Self {
        [q.x, q.y, q.z, q.w]
    }
}

/// Roll, pitch, yaw in radians.
///
/// Roll and yaw lie in (-π, π], pitch in [-π/2, π/2].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// Rotation converter bound to a set of tolerances.
///
/// Holds only its `Copy` config; every conversion is a pure function.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationConverter {
    config: ConverterConfig,
}

impl RotationConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Quaternion to roll-pitch-yaw.
    ///
    /// ```text
    /// roll  = atan2(2(wx + yz), 1 - 2(x² + y²))
    /// pitch = asin(2(wy - zx))
    /// yaw   = atan2(2(wz + xy), 1 - 2(y² + z²))
    /// ```
    ///
    /// The `asin` argument is clamped to [-1, 1], so a quaternion at the
    /// poles saturates to pitch = ±π/2 instead of producing NaN.
    pub fn quaternion_to_euler(&self, q: Quaternion) -> Result<EulerAngles> {
        self.check_quaternion(&q)?;
        let Quaternion { x, y, z, w } = q;

        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));

        let sin_pitch = 2.0 * (w * y - z * x);
        if sin_pitch.abs() > 1.0 {
            debug!(sin_pitch, "Clamping pitch sine at gimbal pole");
        }
        let pitch = sin_pitch.clamp(-1.0, 1.0).asin();

        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        Ok(EulerAngles::new(half_open(roll), pitch, half_open(yaw)))
    }

    /// Quaternion to rotation matrix, closed form with no trigonometry.
    ///
    /// With validation disabled this is defined for any 4-tuple; the result is
    /// orthonormal only for unit input.
    pub fn quaternion_to_matrix(&self, q: Quaternion) -> Result<RotationMatrix> {
        self.check_quaternion(&q)?;
        Ok(quaternion_matrix_kernel(&q))
    }

    /// Rotation matrix to quaternion.
    ///
    /// Shepperd's method: when the trace is at least every diagonal element,
    /// w is the largest component and comes from `w = sqrt(trace + 1) / 2`
    /// with x, y, z from the off-diagonal differences. Otherwise the largest
    /// diagonal element picks which of x, y, z is extracted first, so no
    /// division is by a component smaller than 1/2.
    ///
    /// Once trace + 1 drops to `degenerate_threshold` (rotation angle near π)
    /// the configured [`DegeneratePolicy`] decides between the largest-diagonal
    /// extraction and a `Degenerate` error.
    ///
    /// The result is unit-norm with w ≥ 0.
    pub fn matrix_to_quaternion(&self, m: &RotationMatrix) -> Result<Quaternion> {
        self.check_matrix(m)?;

        let trace = m.trace();
        let max_diagonal = m[(0, 0)].max(m[(1, 1)]).max(m[(2, 2)]);
        let q = if trace + 1.0 <= self.config.degenerate_threshold {
            match self.config.degenerate_policy {
                DegeneratePolicy::Reject => return Err(RotationError::degenerate(trace)),
                DegeneratePolicy::Shepperd => {
                    debug!(trace, "Trace extraction degenerate, using largest diagonal");
                    diagonal_kernel(m)
                }
            }
        } else if trace >= max_diagonal {
            let w = (trace + 1.0).sqrt() / 2.0;
            let four_w = 4.0 * w;
            Quaternion::new(
                (m[(2, 1)] - m[(1, 2)]) / four_w,
                (m[(0, 2)] - m[(2, 0)]) / four_w,
                (m[(1, 0)] - m[(0, 1)]) / four_w,
                w,
            )
        } else {
            diagonal_kernel(m)
        };

        let q = q.normalized();
        Ok(if q.w < 0.0 { q.negated() } else { q })
    }

    /// Rotation matrix to roll-pitch-yaw.
    ///
    /// Within `gimbal_epsilon` of pitch = ±π/2 the yaw is pinned to zero and
    /// the whole in-plane rotation is reported as roll.
    pub fn matrix_to_euler(&self, m: &RotationMatrix) -> Result<EulerAngles> {
        self.check_matrix(m)?;

        let pitch = (-m[(2, 0)]).atan2((m[(0, 0)].powi(2) + m[(1, 0)].powi(2)).sqrt());
        let eps = self.config.gimbal_epsilon;

        let angles = if (pitch - FRAC_PI_2).abs() < eps {
            EulerAngles::new(half_open(m[(0, 1)].atan2(m[(1, 1)])), pitch, 0.0)
        } else if (pitch + FRAC_PI_2).abs() < eps {
            EulerAngles::new(half_open(-m[(0, 1)].atan2(m[(1, 1)])), pitch, 0.0)
        } else {
            let sec_pitch = 1.0 / pitch.cos();
            let yaw = (m[(1, 0)] * sec_pitch).atan2(m[(0, 0)] * sec_pitch);
            let roll = (m[(2, 1)] * sec_pitch).atan2(m[(2, 2)] * sec_pitch);
            EulerAngles::new(half_open(roll), pitch, half_open(yaw))
        };
        Ok(angles)
    }

    /// Validate a quaternion against `unit_norm_tolerance`.
    pub fn check_quaternion(&self, q: &Quaternion) -> Result<()> {
        if !self.config.validate_inputs {
            return Ok(());
        }
        let norm = q.norm();
        if !q.is_finite() || (norm - 1.0).abs() > self.config.unit_norm_tolerance {
            return Err(RotationError::invalid_quaternion(norm));
        }
        Ok(())
    }

    /// Validate a matrix against `orthonormal_tolerance`.
    pub fn check_matrix(&self, m: &RotationMatrix) -> Result<()> {
        if !self.config.validate_inputs {
            return Ok(());
        }
        if !m.iter().all(|v| v.is_finite()) {
            return Err(RotationError::invalid_matrix("non-finite entry"));
        }

        let tol = self.config.orthonormal_tolerance;
        let gram_error = (m.transpose() * m - Matrix3::identity()).amax();
        if gram_error > tol {
            return Err(RotationError::invalid_matrix(format!(
                "not orthonormal, max |RᵗR - I| = {:e}",
                gram_error
            )));
        }
        let det = m.determinant();
        if (det - 1.0).abs() > tol {
            return Err(RotationError::invalid_matrix(format!(
                "determinant is {}, expected 1",
                det
            )));
        }
        Ok(())
    }
}

/// Map an `atan2` result from [-π, π] onto (-π, π].
fn half_open(angle: f64) -> f64 {
    if angle == -PI { PI } else { angle }
}

/// Bilinear quaternion-to-matrix form.
#[rustfmt::skip]
fn quaternion_matrix_kernel(q: &Quaternion) -> RotationMatrix {
    let Quaternion { x, y, z, w } = *q;
    Matrix3::new(
        1.0 - 2.0 * y * y - 2.0 * z * z, 2.0 * x * y - 2.0 * z * w,       2.0 * x * z + 2.0 * y * w,
        2.0 * x * y + 2.0 * z * w,       1.0 - 2.0 * x * x - 2.0 * z * z, 2.0 * y * z - 2.0 * x * w,
        2.0 * x * z - 2.0 * y * w,       2.0 * y * z + 2.0 * x * w,       1.0 - 2.0 * x * x - 2.0 * y * y,
    )
}

/// Largest-diagonal branch of Shepperd's method: extract the x, y or z
/// component picked by the largest diagonal element first, then the rest
/// from sums and differences of off-diagonal pairs.
///
/// With that diagonal element at m_ii, 1 + m_ii - m_jj - m_kk ≥ 1 whenever
/// m_ii exceeds the trace, and stays positive at trace + 1 ≈ 0.
fn diagonal_kernel(m: &RotationMatrix) -> Quaternion {
    let (m00, m11, m22) = (m[(0, 0)], m[(1, 1)], m[(2, 2)]);

    if m00 >= m11 && m00 >= m22 {
        let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt(); // s = 4x
        Quaternion::new(
            0.25 * s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
            (m[(2, 1)] - m[(1, 2)]) / s,
        )
    } else if m11 >= m22 {
        let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt(); // s = 4y
        Quaternion::new(
            (m[(0, 1)] + m[(1, 0)]) / s,
            0.25 * s,
            (m[(1, 2)] + m[(2, 1)]) / s,
            (m[(0, 2)] - m[(2, 0)]) / s,
        )
    } else {
        let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt(); // s = 4z
        Quaternion::new(
            (m[(0, 2)] + m[(2, 0)]) / s,
            (m[(1, 2)] + m[(2, 1)]) / s,
            0.25 * s,
            (m[(1, 0)] - m[(0, 1)]) / s,
        )
    }
}

/// Roll-pitch-yaw to rotation matrix, R = Rz(yaw) · Ry(pitch) · Rx(roll).
pub fn euler_to_matrix(angles: EulerAngles) -> RotationMatrix {
    Rotation3::from_euler_angles(angles.roll, angles.pitch, angles.yaw).into_inner()
}

/// Roll-pitch-yaw to quaternion, same convention as [`euler_to_matrix`].
pub fn euler_to_quaternion(angles: EulerAngles) -> Quaternion {
    let (sr, cr) = (angles.roll * 0.5).sin_cos();
    let (sp, cp) = (angles.pitch * 0.5).sin_cos();
    let (sy, cy) = (angles.yaw * 0.5).sin_cos();

    Quaternion::new(
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    )
}

/// [`RotationConverter::quaternion_to_euler`] with the default config.
pub fn quaternion_to_euler(q: Quaternion) -> Result<EulerAngles> {
    RotationConverter::default().quaternion_to_euler(q)
}

/// [`RotationConverter::quaternion_to_matrix`] with the default config.
pub fn quaternion_to_matrix(q: Quaternion) -> Result<RotationMatrix> {
    RotationConverter::default().quaternion_to_matrix(q)
}

/// [`RotationConverter::matrix_to_quaternion`] with the default config.
pub fn matrix_to_quaternion(m: &RotationMatrix) -> Result<Quaternion> {
    RotationConverter::default().matrix_to_quaternion(m)
}

/// [`RotationConverter::matrix_to_euler`] with the default config.
pub fn matrix_to_euler(m: &RotationMatrix) -> Result<EulerAngles> {
    RotationConverter::default().matrix_to_euler(m)
}
