use crate::math::quat::Quat;
use crate::math::vec::Vec3;

/// Rigid transform (rotation + translation, uniform scale 1).
///
/// `rotation` must be a unit quaternion; callers normalize wire data before
/// constructing one of these.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RigidTransform {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl RigidTransform {
    pub const IDENTITY: RigidTransform = RigidTransform {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p) + self.translation
    }

    /// Invert the transform: R' = R⁻¹, t' = -(R'·t).
    ///
    /// Turns a world-to-camera pose into the camera-to-world transform the
    /// renderer needs (and vice versa).
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.conjugate();
        Self {
            rotation,
            translation: -rotation.rotate(self.translation),
        }
    }

    /// Composition: first `other`, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation.mul(other.rotation),
            translation: self.rotation.rotate(other.translation) + self.translation,
        }
    }
}
