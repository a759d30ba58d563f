//! Input source snapshots and descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gamepad::{GamepadLayout, XrGamepad};
use crate::profile::{self, DeviceIdentity, ProfilePolicy, UNKNOWN_PROFILE};
use crate::space::SpaceId;

/// Stable identity of a logical device, assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one input source instance. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InputSourceId(pub(crate) u64);

impl InputSourceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InputSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Hand the device is held in or associated with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Handedness {
    #[default]
    None,
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// How the target ray is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetRayMode {
    /// Ray from the viewer's head along the gaze
    Gaze,
    /// Ray from a tracked handheld device
    #[default]
    TrackedPointer,
    /// Ray through a tapped point on a 2D surface
    Screen,
}

impl TargetRayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gaze => "gaze",
            Self::TrackedPointer => "tracked-pointer",
            Self::Screen => "screen",
        }
    }
}

/// Degrees of freedom the device layer can track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingLevel {
    /// Not tracked (voice, clicker)
    None,
    /// Orientation only; positions are emulated
    #[serde(rename = "3dof")]
    ThreeDof,
    /// Orientation and position
    #[default]
    #[serde(rename = "6dof")]
    SixDof,
}

/// Host description of a device.
///
/// Two descriptors that differ in any field describe different input
/// sources: the registry retires the old source and publishes a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSourceDescriptor {
    #[serde(default)]
    pub handedness: Handedness,
    #[serde(default)]
    pub target_ray_mode: TargetRayMode,
    #[serde(default)]
    pub tracking: TrackingLevel,
    #[serde(default)]
    pub identity: DeviceIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamepad: Option<GamepadLayout>,
}

impl InputSourceDescriptor {
    /// A grip space exists only for tracked handheld devices
    pub fn has_grip(&self) -> bool {
        self.target_ray_mode == TargetRayMode::TrackedPointer
            && self.tracking != TrackingLevel::None
    }

    /// Transient screen touch
    pub fn screen() -> Self {
        Self {
            handedness: Handedness::None,
            target_ray_mode: TargetRayMode::Screen,
            tracking: TrackingLevel::SixDof,
            identity: DeviceIdentity::default(),
            gamepad: None,
        }
    }
}

/// Immutable snapshot of one input source.
///
/// Compared by identity: two snapshots are equal when they describe the
/// same source instance, even if gamepad readings differ between frames.
#[derive(Debug, Clone)]
pub struct InputSource {
    id: InputSourceId,
    device: DeviceId,
    handedness: Handedness,
    target_ray_mode: TargetRayMode,
    tracking: TrackingLevel,
    target_ray_space: SpaceId,
    grip_space: Option<SpaceId>,
    profiles: Vec<String>,
    identifier: String,
    gamepad: Option<XrGamepad>,
}

impl PartialEq for InputSource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InputSource {}

impl InputSource {
    pub(crate) fn new(
        id: InputSourceId,
        device: DeviceId,
        descriptor: &InputSourceDescriptor,
        target_ray_space: SpaceId,
        grip_space: Option<SpaceId>,
        policy: ProfilePolicy,
    ) -> Self {
        let identifier = profile::identifier(&descriptor.identity, policy);
        let profiles = profile::profiles(
            &descriptor.identity,
            descriptor.target_ray_mode,
            descriptor.gamepad.as_ref(),
            policy,
        );
        let gamepad = descriptor.gamepad.map(|layout| {
            let id = profiles
                .first()
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PROFILE.to_string());
            XrGamepad::new(id, layout)
        });
        Self {
            id,
            device,
            handedness: descriptor.handedness,
            target_ray_mode: descriptor.target_ray_mode,
            tracking: descriptor.tracking,
            target_ray_space,
            grip_space,
            profiles,
            identifier,
            gamepad,
        }
    }

    /// Same source with new gamepad readings
    pub(crate) fn with_gamepad(&self, gamepad: XrGamepad) -> Self {
        Self {
            gamepad: Some(gamepad),
            ..self.clone()
        }
    }

    pub fn id(&self) -> InputSourceId {
        self.id
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn target_ray_mode(&self) -> TargetRayMode {
        self.target_ray_mode
    }

    pub fn tracking(&self) -> TrackingLevel {
        self.tracking
    }

    pub fn target_ray_space(&self) -> SpaceId {
        self.target_ray_space
    }

    pub fn grip_space(&self) -> Option<SpaceId> {
        self.grip_space
    }

    /// Profiles, most specific first
    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    /// `"unknown"` or `<vendor>-<product>`
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn gamepad(&self) -> Option<&XrGamepad> {
        self.gamepad.as_ref()
    }

    /// Transient sources exist only for the duration of one action
    pub fn is_transient(&self) -> bool {
        self.target_ray_mode == TargetRayMode::Screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::GamepadLayout;

    fn controller() -> InputSourceDescriptor {
        InputSourceDescriptor {
            handedness: Handedness::Right,
            target_ray_mode: TargetRayMode::TrackedPointer,
            tracking: TrackingLevel::SixDof,
            identity: DeviceIdentity::new("oculus", "touch"),
            gamepad: Some(GamepadLayout::full()),
        }
    }

    #[test]
    fn test_grip_requires_tracked_pointer() {
        assert!(controller().has_grip());
        let untracked = InputSourceDescriptor {
            tracking: TrackingLevel::None,
            ..controller()
        };
        assert!(!untracked.has_grip());
        let gaze = InputSourceDescriptor {
            target_ray_mode: TargetRayMode::Gaze,
            ..controller()
        };
        assert!(!gaze.has_grip());
        assert!(!InputSourceDescriptor::screen().has_grip());
    }

    #[test]
    fn test_equality_is_identity() {
        let a = InputSource::new(
            InputSourceId(1),
            DeviceId(1),
            &controller(),
            SpaceId(1),
            Some(SpaceId(2)),
            ProfilePolicy::default(),
        );
        let mut gamepad = a.gamepad().unwrap().clone();
        gamepad.set_timestamp(5);
        let b = a.with_gamepad(gamepad);
        assert_eq!(a, b);

        let c = InputSource::new(
            InputSourceId(2),
            DeviceId(1),
            &controller(),
            SpaceId(1),
            Some(SpaceId(2)),
            ProfilePolicy::default(),
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_gamepad_id_follows_profile() {
        let source = InputSource::new(
            InputSourceId(1),
            DeviceId(1),
            &controller(),
            SpaceId(1),
            None,
            ProfilePolicy::default(),
        );
        assert_eq!(source.identifier(), "oculus-touch");
        assert_eq!(source.gamepad().unwrap().id(), "oculus-touch");
        assert_eq!(source.profiles()[1], "generic-trigger-squeeze-touchpad-thumbstick");
    }

    #[test]
    fn test_descriptor_from_toml() {
        let descriptor: InputSourceDescriptor = toml::from_str(
            r#"
            handedness = "left"
            target_ray_mode = "tracked-pointer"
            tracking = "3dof"
            identity = { vendor = "google", product = "daydream" }
            gamepad = { capabilities = "TRIGGER | TOUCHPAD" }
            "#,
        )
        .expect("deserialize");
        assert_eq!(descriptor.handedness, Handedness::Left);
        assert_eq!(descriptor.tracking, TrackingLevel::ThreeDof);
        assert_eq!(descriptor.gamepad.unwrap().extra_buttons, 0);
    }
}
