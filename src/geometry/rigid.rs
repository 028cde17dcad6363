//! RigidTransform: 6-DOF rotation + translation.
//!
//! Used for device-to-reference poses and for the output of the Kabsch
//! solver. Unlike a similarity transform there is no scale component.

use nalgebra::{Matrix3, Matrix4, Rotation3, UnitQuaternion, Vector3};

/// Rigid transformation: rotation followed by translation.
///
/// Transforms points as: p' = R * p + t
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    /// Identity transformation (no rotation, no translation).
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Construct from a rotation matrix and translation.
    ///
    /// The matrix is re-orthonormalized through the quaternion conversion.
    pub fn from_rt(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        let rot3 = Rotation3::from_matrix_unchecked(rotation);
        Self {
            rotation: UnitQuaternion::from_rotation_matrix(&rot3),
            translation,
        }
    }

    /// Construct from homogeneous 4x4 matrix of form [R | t; 0 | 1].
    pub fn from_matrix(mat: &Matrix4<f64>) -> Self {
        let r_block = mat.fixed_view::<3, 3>(0, 0).into_owned();
        let translation = Vector3::new(mat[(0, 3)], mat[(1, 3)], mat[(2, 3)]);
        Self::from_rt(r_block, translation)
    }

    /// Convert to homogeneous 4x4 matrix of form [R | t; 0 0 0 1].
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let mut mat = Matrix4::identity();
        mat.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&self.rotation_matrix());
        mat.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        mat
    }

    /// Inverse transformation.
    ///
    /// For T = [R | t]: T^{-1} = [R^T | -R^T * t]
    pub fn inverse(&self) -> Self {
        let rot_inv = self.rotation.inverse();
        Self {
            rotation: rot_inv,
            translation: -(rot_inv * self.translation),
        }
    }

    /// Compose two transforms: self ∘ other (apply `other` first).
    ///
    /// The composed rotation is renormalized to keep drift out of repeated
    /// compositions.
    pub fn compose(&self, other: &RigidTransform) -> Self {
        let mut rotation = self.rotation * other.rotation;
        rotation.renormalize();
        Self {
            rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Transform a single point: p' = R * p + t.
    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * p + self.translation
    }

    /// Rotate a direction vector (translation is not applied).
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }

    pub fn transform_points(&self, pts: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        pts.iter().map(|p| self.transform_point(p)).collect()
    }

    /// Rotate an orientation into this transform's target frame.
    pub fn transform_rotation(&self, q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        let mut out = self.rotation * q;
        out.renormalize();
        out
    }

    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.rotation.to_rotation_matrix().into_inner()
    }

    /// Rotation angle (radians) and translation norm of this transform.
    pub fn magnitude(&self) -> (f64, f64) {
        (self.rotation.angle(), self.translation.norm())
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}
