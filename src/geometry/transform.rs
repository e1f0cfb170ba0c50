//! Rigid transforms for composing sensor extrinsics.
//!
//! Calibration results usually arrive as a quaternion plus a translation
//! (e.g. the camera pose in the robot base frame) and have to be chained and
//! inverted before being read back as a quaternion or roll-pitch-yaw.
//!
//! We use the notation `T_target_source`: `p_target = T_target_source * p_source`.

use nalgebra::{Matrix3, Matrix4, Vector3};

use super::rotation::{EulerAngles, Quaternion, RotationConverter, RotationMatrix};
use crate::error::{Result, RotationError};

/// 6-DOF rigid transformation: p' = R * p + t.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: RotationMatrix,
    pub translation: Vector3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// Identity transformation (no rotation, no translation).
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Construct from a rotation matrix and translation, validating the rotation.
    pub fn from_rt(
        converter: &RotationConverter,
        rotation: RotationMatrix,
        translation: Vector3<f64>,
    ) -> Result<Self> {
        converter.check_matrix(&rotation)?;
        Ok(Self {
            rotation,
            translation,
        })
    }

    /// Construct from an (x, y, z, w) quaternion and translation.
    pub fn from_quaternion(
        converter: &RotationConverter,
        q: Quaternion,
        translation: Vector3<f64>,
    ) -> Result<Self> {
        let rotation = converter.quaternion_to_matrix(q)?;
        Ok(Self {
            rotation,
            translation,
        })
    }

    /// Construct from a homogeneous 4x4 matrix of form [R | t; 0 0 0 1].
    pub fn from_matrix(converter: &RotationConverter, mat: &Matrix4<f64>) -> Result<Self> {
        let tol = converter.config().orthonormal_tolerance;
        let bottom = [mat[(3, 0)], mat[(3, 1)], mat[(3, 2)], mat[(3, 3)] - 1.0];
        if bottom.iter().any(|v| !v.is_finite() || v.abs() > tol) {
            return Err(RotationError::invalid_matrix(format!(
                "homogeneous bottom row is [{}, {}, {}, {}], expected [0, 0, 0, 1]",
                mat[(3, 0)],
                mat[(3, 1)],
                mat[(3, 2)],
                mat[(3, 3)]
            )));
        }

        let rotation = mat.fixed_view::<3, 3>(0, 0).into_owned();
        let translation = Vector3::new(mat[(0, 3)], mat[(1, 3)], mat[(2, 3)]);
        Self::from_rt(converter, rotation, translation)
    }

    /// Convert to homogeneous 4x4 matrix of form [R | t; 0 0 0 1].
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let mut mat = Matrix4::identity();
        mat.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        mat.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        mat
    }

    /// Inverse transformation.
    ///
    /// T = [R | t; 0 | 1], T^{-1} = [R^T | -R^T*t; 0 | 1]
    pub fn inverse(&self) -> Self {
        let rot_inv = self.rotation.transpose();
        Self {
            rotation: rot_inv,
            translation: -(rot_inv * self.translation),
        }
    }

    /// Compose two transforms: self ∘ other.
    ///
    /// T_a_c = T_a_b.compose(&T_b_c)
    pub fn compose(&self, other: &RigidTransform) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Transform a single point: p' = R * p + t.
    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * p + self.translation
    }

    /// Rotation part as a quaternion with w ≥ 0.
    pub fn quaternion(&self, converter: &RotationConverter) -> Result<Quaternion> {
        converter.matrix_to_quaternion(&self.rotation)
    }

    /// Rotation part as roll-pitch-yaw.
    pub fn euler(&self, converter: &RotationConverter) -> Result<EulerAngles> {
        converter.matrix_to_euler(&self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rotation::euler_to_matrix;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn sample_transform(converter: &RotationConverter) -> RigidTransform {
        let half = 0.35_f64;
        let axis = Vector3::new(0.2, -0.5, 0.8).normalize() * half.sin();
        let q = Quaternion::new(axis.x, axis.y, axis.z, half.cos());
        RigidTransform::from_quaternion(converter, q, Vector3::new(0.1, -0.2, 1.5)).unwrap()
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        let converter = RotationConverter::default();
        let t = sample_transform(&converter);

        let product = t.compose(&t.inverse());
        assert_relative_eq!(product.rotation, Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(product.translation, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_compose_matches_matrix_product() {
        let converter = RotationConverter::default();
        let a = sample_transform(&converter);
        let b = RigidTransform::from_rt(
            &converter,
            euler_to_matrix(EulerAngles::new(0.1, 0.4, -1.2)),
            Vector3::new(-3.0, 0.5, 0.25),
        )
        .unwrap();

        let composed = a.compose(&b).to_matrix();
        assert_relative_eq!(composed, a.to_matrix() * b.to_matrix(), epsilon = 1e-12);
    }

    #[test]
    fn test_transform_point() {
        let converter = RotationConverter::default();
        let yaw_90 = euler_to_matrix(EulerAngles::new(0.0, 0.0, FRAC_PI_2));
        let t = RigidTransform::from_rt(&converter, yaw_90, Vector3::new(1.0, 0.0, 0.0)).unwrap();

        let p = t.transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_round_trip() {
        let converter = RotationConverter::default();
        let t = sample_transform(&converter);

        let back = RigidTransform::from_matrix(&converter, &t.to_matrix()).unwrap();
        assert_relative_eq!(back.rotation, t.rotation, epsilon = 1e-15);
        assert_relative_eq!(back.translation, t.translation, epsilon = 1e-15);
    }

    #[test]
    fn test_from_matrix_rejects_bad_bottom_row() {
        let converter = RotationConverter::default();
        let mut mat = Matrix4::identity();
        mat[(3, 0)] = 0.5;

        assert!(matches!(
            RigidTransform::from_matrix(&converter, &mat),
            Err(RotationError::InvalidMatrix(_))
        ));
    }

    #[test]
    fn test_from_matrix_rejects_scaled_rotation() {
        let converter = RotationConverter::default();
        let mut mat = Matrix4::identity();
        mat[(0, 0)] = 2.0;

        assert!(RigidTransform::from_matrix(&converter, &mat).is_err());
    }

    #[test]
    fn test_quaternion_and_euler_readback() {
        let converter = RotationConverter::default();
        let angles = EulerAngles::new(0.3, -0.2, 0.9);
        let t =
            RigidTransform::from_rt(&converter, euler_to_matrix(angles), Vector3::zeros()).unwrap();

        let rpy = t.euler(&converter).unwrap();
        assert_relative_eq!(rpy.roll, angles.roll, epsilon = 1e-12);
        assert_relative_eq!(rpy.pitch, angles.pitch, epsilon = 1e-12);
        assert_relative_eq!(rpy.yaw, angles.yaw, epsilon = 1e-12);

        let q = t.quaternion(&converter).unwrap();
        assert!(q.w >= 0.0);
        let inv_q = t.inverse().quaternion(&converter).unwrap();
        assert!(inv_q.same_rotation(&Quaternion::new(-q.x, -q.y, -q.z, q.w), 1e-12));
    }
}
