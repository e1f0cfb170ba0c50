//! Geometry utilities: rotation representation conversions, rigid transforms.

pub mod rotation;
pub mod transform;

pub use rotation::{
    EulerAngles, Quaternion, RotationConverter, RotationMatrix, euler_to_matrix,
    euler_to_quaternion, matrix_to_euler, matrix_to_quaternion, quaternion_to_euler,
    quaternion_to_matrix,
};
pub use transform::RigidTransform;
