//! Rigid placement transforms (rotation followed by translation).
use glam::{DQuat, DVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Orthonormal rotation plus translation mapping a child frame into its parent.
///
/// The rotation is stored as a unit quaternion so the linear part stays
/// orthonormal by construction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub rotation: DQuat,
    pub translation: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: DQuat::IDENTITY,
        translation: DVec3::ZERO,
    };

    pub fn new(rotation: DQuat, translation: DVec3) -> Self {
        Self {
            rotation: rotation.normalize(),
            translation,
        }
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            rotation: DQuat::IDENTITY,
            translation,
        }
    }

    /// Rotation about the Y axis by `angle` radians, then translation.
    pub fn from_rotation_y(angle: f64, translation: DVec3) -> Self {
        Self::new(DQuat::from_rotation_y(angle), translation)
    }

    /// Map a point expressed in the child frame into the parent frame.
    #[inline]
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.rotation * p + self.translation
    }

    /// Map a point expressed in the parent frame back into the child frame.
    #[inline]
    pub fn inverse_transform_point(&self, p: DVec3) -> DVec3 {
        self.rotation.inverse() * (p - self.translation)
    }

    /// Compose so that `parent.then(child)` maps child-frame points straight
    /// into the parent's parent frame.
    pub fn then(&self, child: &Transform) -> Transform {
        Transform {
            rotation: (self.rotation * child.rotation).normalize(),
            translation: self.transform_point(child.translation),
        }
    }
}
