//! Poses and rays
//!
//! All transforms are right-handed, column-major `glam::Mat4` values. A
//! pose's transform maps coordinates in the posed space into the base
//! space it was resolved against.

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::error::InputError;

/// Directions closer than this to zero length are rejected
const MIN_DIRECTION_LENGTH_SQ: f32 = 1e-12;

/// A resolved transform between two spaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Base-from-space transform
    pub transform: Mat4,
    /// Translation is estimated (e.g. 3DOF device with an arm model)
    pub emulated_position: bool,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            emulated_position: false,
        }
    }
}

impl Pose {
    /// Create a tracked pose from a position and orientation
    pub fn from_position_orientation(position: Vec3, orientation: Quat) -> Self {
        Self {
            transform: Mat4::from_rotation_translation(orientation, position),
            emulated_position: false,
        }
    }

    /// Translation component
    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Rotation component
    pub fn orientation(&self) -> Quat {
        let (_, rotation, _) = self.transform.to_scale_rotation_translation();
        rotation
    }

    /// The target ray this pose describes (origin at the pose, pointing down -Z)
    pub fn ray(&self) -> XrRay {
        XrRay::from_transform(&self.transform)
    }
}

/// A pointing ray: origin point (w = 1) and unit direction (w = 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XrRay {
    origin: Vec4,
    direction: Vec4,
}

impl Default for XrRay {
    fn default() -> Self {
        Self {
            origin: Vec4::W,
            direction: Vec3::NEG_Z.extend(0.0),
        }
    }
}

impl XrRay {
    /// Create a ray, normalizing the direction
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DegenerateRay`] if the direction has zero
    /// length or any component of the ray is not finite.
    pub fn new(origin: Vec3, direction: Vec3) -> Result<Self, InputError> {
        if !origin.is_finite()
            || !direction.is_finite()
            || direction.length_squared() < MIN_DIRECTION_LENGTH_SQ
        {
            return Err(InputError::DegenerateRay);
        }
        Ok(Self {
            origin: origin.extend(1.0),
            direction: direction.normalize().extend(0.0),
        })
    }

    /// Ray obtained by transforming the canonical ray (origin 0, direction -Z)
    pub fn from_transform(transform: &Mat4) -> Self {
        let origin = transform.transform_point3(Vec3::ZERO);
        let direction = transform.transform_vector3(Vec3::NEG_Z).normalize_or_zero();
        if direction == Vec3::ZERO {
            return Self {
                origin: origin.extend(1.0),
                ..Self::default()
            };
        }
        Self {
            origin: origin.extend(1.0),
            direction: direction.extend(0.0),
        }
    }

    pub fn origin(&self) -> Vec4 {
        self.origin
    }

    pub fn direction(&self) -> Vec4 {
        self.direction
    }

    /// Transform mapping the canonical -Z ray at the origin onto this ray
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, self.direction.truncate());
        Mat4::from_rotation_translation(rotation, self.origin.truncate())
    }
}
