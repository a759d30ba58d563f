//! XR Input Core - Frame-synchronous XR input sources
//!
//! This crate tracks the input sources of an XR session (tracked
//! controllers, gaze, voice, screen touches), drives their select and
//! squeeze lifecycles, and resolves their poses against frozen frame
//! snapshots.
//!
//! # Architecture
//!
//! - [`XrInputSession`] - Buffers host input and publishes it once per tick
//! - [`InputSourceRegistry`] - Active sources and change notifications
//! - [`SelectionStateMachine`] - Start / end / complete lifecycle per action
//! - [`PoseResolver`] - Pose of one space relative to another
//! - [`ScreenInputAdapter`] - Pointer events to transient `screen` sources
//! - [`script`] - TOML scenarios for regression tests

pub mod action_map;
pub mod config;
pub mod error;
pub mod event;
pub mod frame;
pub mod gamepad;
#[cfg(test)]
mod integration;
pub mod pose;
pub mod profile;
pub mod registry;
pub mod screen;
pub mod script;
pub mod selection;
pub mod session;
pub mod source;
pub mod space;
pub mod tracking;

// Re-export session types
pub use config::{Config, InputConfig, ScreenConfig, TrackingConfig};
pub use error::InputError;
pub use session::{ActionOp, XrInputSession};

// Re-export input source types
pub use event::{
    InputEventKind, InputSourceEvent, InputSourcesChangeEvent, LastInputSource, NO_BUTTON, XrEvent,
};
pub use gamepad::{GamepadButton, GamepadCapabilities, GamepadLayout, RawButton, XrGamepad};
pub use profile::{DeviceIdentity, ProfilePolicy, UNKNOWN_PROFILE};
pub use registry::{ChangeListener, InputSourceRegistry};
pub use selection::{ActionKind, ActionPhase, SelectionState, SelectionStateMachine};
pub use source::{
    DeviceId, Handedness, InputSource, InputSourceDescriptor, InputSourceId, TargetRayMode,
    TrackingLevel,
};

// Re-export pose resolution types
pub use frame::{Eye, View, ViewerPose, XrFrame};
pub use pose::{Pose, XrRay};
pub use space::{ReferenceSpaceType, SpaceId, SpaceKind};
pub use tracking::{PoseResolver, TrackingState};

// Re-export adapters
pub use action_map::{ActionBinding, ActionMap, ActionValue, BindingSource, ButtonComponent};
pub use screen::{PointerEvent, PointerEventKind, ScreenInputAdapter};
pub use script::{ScenarioReport, ScenarioRunner, ScenarioScript, ScriptError};
