//! xr-standard gamepad state attached to input sources
//!
//! The canonical layout reserves four buttons and four axes on every
//! gamepad, whether or not the device can drive them:
//!
//! | Slot | Button | Axis |
//! |------|--------|------|
//! | 0 | primary trigger | primary X (touchpad / stick) |
//! | 1 | primary touch / stick click | primary Y |
//! | 2 | grip / secondary trigger | secondary X (thumbstick) |
//! | 3 | secondary click | secondary Y |
//!
//! Device-specific controls are appended after slot 3.

mod deadzone;
#[cfg(feature = "gamepad")]
pub mod gilrs_bridge;

pub use deadzone::{apply_stick_deadzone, apply_trigger_deadzone};

use serde::{Deserialize, Serialize};

use crate::config::InputConfig;

/// Mapping name reported by every gamepad attached to an input source
pub const XR_STANDARD_MAPPING: &str = "xr-standard";

/// Number of reserved button slots
pub const CANONICAL_BUTTONS: usize = 4;

/// Number of reserved axis slots
pub const CANONICAL_AXES: usize = 4;

/// Primary trigger button slot
pub const BUTTON_TRIGGER: usize = 0;
/// Primary touchpad / stick click slot
pub const BUTTON_TOUCHPAD: usize = 1;
/// Grip / squeeze button slot
pub const BUTTON_SQUEEZE: usize = 2;
/// Secondary thumbstick click slot
pub const BUTTON_THUMBSTICK: usize = 3;

/// Primary X/Y axis slots
pub const AXIS_TOUCHPAD_X: usize = 0;
pub const AXIS_TOUCHPAD_Y: usize = 1;
/// Secondary X/Y axis slots
pub const AXIS_THUMBSTICK_X: usize = 2;
pub const AXIS_THUMBSTICK_Y: usize = 3;

bitflags::bitflags! {
    /// Physical controls a device actually has in the canonical slots
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GamepadCapabilities: u8 {
        /// Button 0
        const TRIGGER = 0b0000_0001;
        /// Button 1, axes 0-1
        const TOUCHPAD = 0b0000_0010;
        /// Button 2
        const SQUEEZE = 0b0000_0100;
        /// Button 3, axes 2-3
        const THUMBSTICK = 0b0000_1000;
    }
}

/// Shape of a device's gamepad. Part of the input source descriptor:
/// changing it recreates the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GamepadLayout {
    pub capabilities: GamepadCapabilities,
    /// Device-specific buttons after slot 3
    #[serde(default)]
    pub extra_buttons: usize,
    /// Device-specific axes after slot 3
    #[serde(default)]
    pub extra_axes: usize,
}

impl Default for GamepadLayout {
    fn default() -> Self {
        Self {
            capabilities: GamepadCapabilities::TRIGGER,
            extra_buttons: 0,
            extra_axes: 0,
        }
    }
}

impl GamepadLayout {
    /// Layout with every canonical control present
    pub fn full() -> Self {
        Self {
            capabilities: GamepadCapabilities::all(),
            extra_buttons: 0,
            extra_axes: 0,
        }
    }

    pub fn button_count(&self) -> usize {
        CANONICAL_BUTTONS + self.extra_buttons
    }

    pub fn axis_count(&self) -> usize {
        CANONICAL_AXES + self.extra_axes
    }

    /// Whether the device can drive a button slot
    pub fn supports_button(&self, index: usize) -> bool {
        match index {
            BUTTON_TRIGGER => self.capabilities.contains(GamepadCapabilities::TRIGGER),
            BUTTON_TOUCHPAD => self.capabilities.contains(GamepadCapabilities::TOUCHPAD),
            BUTTON_SQUEEZE => self.capabilities.contains(GamepadCapabilities::SQUEEZE),
            BUTTON_THUMBSTICK => self.capabilities.contains(GamepadCapabilities::THUMBSTICK),
            _ => index < self.button_count(),
        }
    }

    /// Whether the device can drive an axis slot
    pub fn supports_axis(&self, index: usize) -> bool {
        match index {
            AXIS_TOUCHPAD_X | AXIS_TOUCHPAD_Y => {
                self.capabilities.contains(GamepadCapabilities::TOUCHPAD)
            }
            AXIS_THUMBSTICK_X | AXIS_THUMBSTICK_Y => {
                self.capabilities.contains(GamepadCapabilities::THUMBSTICK)
            }
            _ => index < self.axis_count(),
        }
    }

    /// Analog slots that should use the trigger deadzone instead of the stick deadzone
    fn is_trigger_slot(index: usize) -> bool {
        matches!(index, BUTTON_TRIGGER | BUTTON_SQUEEZE)
    }
}

/// One button reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadButton {
    pub pressed: bool,
    pub touched: bool,
    pub value: f32,
}

/// Raw button reading from the host, before deadzones and thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawButton {
    /// Digital press reported by the device
    #[serde(default)]
    pub pressed: bool,
    #[serde(default)]
    pub touched: bool,
    /// Analog value (0.0-1.0); digital buttons report 0.0 or 1.0
    #[serde(default)]
    pub value: f32,
}

impl RawButton {
    /// Fully pressed digital button
    pub fn down() -> Self {
        Self {
            pressed: true,
            touched: true,
            value: 1.0,
        }
    }

    /// Analog reading
    pub fn analog(value: f32) -> Self {
        Self {
            pressed: false,
            touched: value > 0.0,
            value,
        }
    }
}

/// Gamepad state as seen through an input source.
///
/// Not a standalone gamepad: [`index`](Self::index) is always -1 and
/// [`connected`](Self::connected) always true while attached.
#[derive(Debug, Clone, PartialEq)]
pub struct XrGamepad {
    id: String,
    layout: GamepadLayout,
    buttons: Vec<GamepadButton>,
    axes: Vec<f32>,
    timestamp: u64,
}

impl XrGamepad {
    /// Create a gamepad at rest with every reserved slot present
    pub fn new(id: impl Into<String>, layout: GamepadLayout) -> Self {
        Self {
            id: id.into(),
            layout,
            buttons: vec![GamepadButton::default(); layout.button_count()],
            axes: vec![0.0; layout.axis_count()],
            timestamp: 0,
        }
    }

    /// Identifier shared with the owning input source's profile
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> i32 {
        -1
    }

    pub fn connected(&self) -> bool {
        true
    }

    pub fn mapping(&self) -> &'static str {
        XR_STANDARD_MAPPING
    }

    pub fn layout(&self) -> &GamepadLayout {
        &self.layout
    }

    pub fn buttons(&self) -> &[GamepadButton] {
        &self.buttons
    }

    pub fn axes(&self) -> &[f32] {
        &self.axes
    }

    pub fn button(&self, index: usize) -> Option<&GamepadButton> {
        self.buttons.get(index)
    }

    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }

    /// Frame index of the last reading applied
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Apply a button reading. Unsupported slots stay at rest.
    pub(crate) fn apply_button(&mut self, index: usize, raw: RawButton, config: &InputConfig) {
        if !self.layout.supports_button(index) {
            return;
        }
        let Some(button) = self.buttons.get_mut(index) else {
            return;
        };
        let value = if GamepadLayout::is_trigger_slot(index) {
            apply_trigger_deadzone(raw.value, config.trigger_deadzone)
        } else if raw.value.is_finite() {
            raw.value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let pressed = raw.pressed || value >= config.press_threshold;
        *button = GamepadButton {
            pressed,
            touched: raw.touched || pressed,
            value,
        };
    }

    /// Apply an axis reading. Unsupported slots stay at rest.
    pub(crate) fn apply_axis(&mut self, index: usize, value: f32, config: &InputConfig) {
        if !self.layout.supports_axis(index) {
            return;
        }
        if let Some(axis) = self.axes.get_mut(index) {
            *axis = apply_stick_deadzone(value, config.stick_deadzone).clamp(-1.0, 1.0);
        }
    }

    pub(crate) fn set_timestamp(&mut self, frame: u64) {
        self.timestamp = frame;
    }
}
