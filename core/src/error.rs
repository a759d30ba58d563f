//! Host-facing error types
//!
//! Runtime absence (lost tracking, disconnected sources, masked device
//! identity) is never an error and is reported through `Option`. These
//! errors cover misuse of the host API only.

use crate::source::{DeviceId, InputSourceId};

/// Errors returned when the host drives the session incorrectly
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// Device is not connected
    #[error("device {0} is not connected")]
    UnknownDevice(DeviceId),

    /// Device is already connected
    #[error("device {0} is already connected")]
    DuplicateDevice(DeviceId),

    /// Input source is neither active nor awaiting completion
    #[error("input source {0} is not known to this session")]
    UnknownSource(InputSourceId),

    /// Device has no gamepad attached
    #[error("device {0} has no gamepad")]
    NoGamepad(DeviceId),

    /// Gamepad slot outside the device layout
    #[error("{kind} slot {index} is outside the layout of device {device}")]
    SlotOutOfRange {
        device: DeviceId,
        kind: &'static str,
        index: usize,
    },

    /// Device has no grip space
    #[error("device {0} has no grip space")]
    NoGripSpace(DeviceId),

    /// Ray direction has zero length or non-finite components
    #[error("ray direction must be a finite, non-zero vector")]
    DegenerateRay,

    /// Space handle was not created by this session
    #[error("space {0} is not known to this session")]
    UnknownSpace(u32),
}
