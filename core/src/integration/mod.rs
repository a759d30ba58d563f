//! Integration tests for the XR input core
//!
//! Tests full session lifecycles across the registry, selection machines,
//! screen adapter and scenario runner.

#[cfg(test)]
mod scenario_tests;

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::{
        config::Config,
        event::XrEvent,
        gamepad::GamepadLayout,
        profile::DeviceIdentity,
        session::XrInputSession,
        source::{Handedness, InputSourceDescriptor, TargetRayMode, TrackingLevel},
    };

    pub fn new_session() -> XrInputSession {
        XrInputSession::new(Config::default())
    }

    /// Six-dof handheld controller with a full xr-standard gamepad
    pub fn controller(handedness: Handedness) -> InputSourceDescriptor {
        InputSourceDescriptor {
            handedness,
            target_ray_mode: TargetRayMode::TrackedPointer,
            tracking: TrackingLevel::SixDof,
            identity: DeviceIdentity::new("valve", "index-controller"),
            gamepad: Some(GamepadLayout::full()),
        }
    }

    /// Untracked voice input targeting along the gaze
    pub fn voice() -> InputSourceDescriptor {
        InputSourceDescriptor {
            target_ray_mode: TargetRayMode::Gaze,
            tracking: TrackingLevel::None,
            ..Default::default()
        }
    }

    /// Event type names in dispatch order
    pub fn names(events: &[XrEvent]) -> Vec<&'static str> {
        events.iter().map(|e| e.name()).collect()
    }
}
