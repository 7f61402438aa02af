use cgmath::{InnerSpace, Matrix4, Quaternion, SquareMatrix};
use serde::{Deserialize, Serialize};

use crate::error::CsgError;
use crate::math::{points_are_near, FVector, Tolerances};

/// World placement of a brush as reported by the host: position, rotation and
/// (possibly non-uniform, possibly negative) scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrushTransform {
    pub position: FVector,
    pub rotation: Quaternion<f32>,
    pub scale: FVector,
}

impl Default for BrushTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl BrushTransform {

    pub fn new() -> BrushTransform {
        BrushTransform {
            position: FVector::new(0.0, 0.0, 0.0),
            rotation: Quaternion::from_sv(1.0, FVector::new(0.0, 0.0, 0.0)),
            scale: FVector::new(1.0, 1.0, 1.0),
        }
    }

    pub fn new_from_position(position: FVector) -> BrushTransform {
        BrushTransform {
            position,
            ..BrushTransform::new()
        }
    }

    pub fn new_from_position_rotation_scale(position: FVector, rotation: Quaternion<f32>, scale: FVector) -> BrushTransform {
        BrushTransform { position, rotation, scale }
    }

    /// Local-to-world matrix: scale, then rotate, then translate.
    pub fn local_to_world(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation.normalize())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn world_to_local(&self) -> Result<Matrix4<f32>, CsgError> {
        self.local_to_world().invert().ok_or(CsgError::SingularTransform)
    }

    /// True when the transform flips handedness (an odd number of negative scale axes).
    pub fn is_mirrored(&self) -> bool {
        self.scale.x * self.scale.y * self.scale.z < 0.0
    }

    pub fn translated(&self, delta: FVector) -> BrushTransform {
        BrushTransform {
            position: self.position + delta,
            ..*self
        }
    }

    /// Compare position, rotation and scale within tolerance. Rotations `q`
    /// and `-q` describe the same orientation.
    pub fn is_same(&self, other: &BrushTransform, tolerances: &Tolerances) -> bool {
        if !points_are_near(&self.position, &other.position, tolerances.distance)
            || !points_are_near(&self.scale, &other.scale, tolerances.distance)
        {
            return false;
        }
        let a = self.rotation.normalize();
        let mut b = other.rotation.normalize();
        if a.s * b.s + a.v.dot(b.v) < 0.0 {
            b = -b;
        }
        (a.s - b.s).abs() < tolerances.normal && points_are_near(&a.v, &b.v, tolerances.normal)
    }
}
