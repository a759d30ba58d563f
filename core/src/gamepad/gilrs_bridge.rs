//! Physical gamepads as emulated tracked-pointer controllers
//!
//! Each gilrs gamepad becomes an untracked right-hand input source whose
//! xr-standard slots are fed from the nearest physical control. Face
//! buttons are appended after the canonical slots.

use gilrs::{Axis, Button, GamepadId, Gilrs};
use hashbrown::HashMap;
use tracing::{info, warn};

use super::{
    AXIS_THUMBSTICK_X, AXIS_THUMBSTICK_Y, AXIS_TOUCHPAD_X, AXIS_TOUCHPAD_Y, BUTTON_SQUEEZE,
    BUTTON_THUMBSTICK, BUTTON_TOUCHPAD, BUTTON_TRIGGER, CANONICAL_BUTTONS, GamepadCapabilities,
    GamepadLayout, RawButton,
};
use crate::profile::DeviceIdentity;
use crate::session::XrInputSession;
use crate::source::{DeviceId, Handedness, InputSourceDescriptor, TargetRayMode, TrackingLevel};

/// First device id used for bridged gamepads
const BRIDGE_DEVICE_BASE: u32 = 0x4000_0000;

/// Physical button feeding each xr-standard slot, in slot order
const BUTTON_MAP: [Button; 8] = [
    Button::RightTrigger2,
    Button::LeftThumb,
    Button::RightTrigger,
    Button::RightThumb,
    Button::South,
    Button::East,
    Button::West,
    Button::North,
];

/// Physical axis feeding each xr-standard axis slot
const AXIS_MAP: [(usize, Axis); 4] = [
    (AXIS_TOUCHPAD_X, Axis::LeftStickX),
    (AXIS_TOUCHPAD_Y, Axis::LeftStickY),
    (AXIS_THUMBSTICK_X, Axis::RightStickX),
    (AXIS_THUMBSTICK_Y, Axis::RightStickY),
];

/// Descriptor for a bridged gamepad
pub fn descriptor(name: &str, vendor_id: Option<u16>) -> InputSourceDescriptor {
    InputSourceDescriptor {
        handedness: Handedness::Right,
        target_ray_mode: TargetRayMode::TrackedPointer,
        tracking: TrackingLevel::None,
        identity: DeviceIdentity {
            vendor: vendor_id.map(|v| format!("{:04x}", v)),
            product: Some(name.to_string()),
        },
        gamepad: Some(GamepadLayout {
            capabilities: GamepadCapabilities::all(),
            extra_buttons: BUTTON_MAP.len() - CANONICAL_BUTTONS,
            extra_axes: 0,
        }),
    }
}

/// Forwards gilrs gamepads into a session
pub struct GilrsBridge {
    /// Gilrs context (None if initialization failed)
    gilrs: Option<Gilrs>,
    devices: HashMap<GamepadId, DeviceId>,
}

impl GilrsBridge {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                warn!(
                    "Failed to initialize gamepad support: {}. Gamepads will not be available.",
                    e
                );
                None
            }
        };
        Self {
            gilrs,
            devices: HashMap::new(),
        }
    }

    /// Session device a gamepad is bridged as
    pub fn device(&self, id: GamepadId) -> Option<DeviceId> {
        self.devices.get(&id).copied()
    }

    /// Poll gilrs, forward connections and push current readings
    pub fn update(&mut self, session: &mut XrInputSession) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };

        while let Some(event) = gilrs.next_event() {
            match event.event {
                gilrs::EventType::Connected => {
                    let device = DeviceId(BRIDGE_DEVICE_BASE + usize::from(event.id) as u32);
                    let gamepad = gilrs.gamepad(event.id);
                    let descriptor = descriptor(gamepad.name(), gamepad.vendor_id());
                    match session.connect(device, descriptor) {
                        Ok(source) => {
                            info!("Gamepad {} bridged as input source {}", event.id, source.id());
                            self.devices.insert(event.id, device);
                        }
                        Err(e) => warn!("Gamepad {} not bridged: {}", event.id, e),
                    }
                }
                gilrs::EventType::Disconnected => {
                    if let Some(device) = self.devices.remove(&event.id) {
                        info!("Gamepad {} disconnected", event.id);
                        if let Err(e) = session.disconnect(device) {
                            warn!("Gamepad {} disconnect: {}", event.id, e);
                        }
                    }
                }
                _ => {}
            }
        }

        for (&id, &device) in &self.devices {
            let gamepad = gilrs.gamepad(id);
            for (slot, button) in BUTTON_MAP.into_iter().enumerate() {
                let raw = match gamepad.button_data(button) {
                    Some(data) => RawButton {
                        pressed: data.is_pressed(),
                        touched: data.is_pressed() || data.value() > 0.0,
                        value: data.value(),
                    },
                    None => RawButton::default(),
                };
                if let Err(e) = session.set_button(device, slot, raw) {
                    warn!("Gamepad {}: {}", id, e);
                }
            }
            for (slot, axis) in AXIS_MAP {
                let value = gamepad.value(axis);
                // xr-standard Y axes point down
                let value = if matches!(slot, AXIS_TOUCHPAD_Y | AXIS_THUMBSTICK_Y) {
                    -value
                } else {
                    value
                };
                if let Err(e) = session.set_axis(device, slot, value) {
                    warn!("Gamepad {}: {}", id, e);
                }
            }
        }
    }
}

impl Default for GilrsBridge {
    fn default() -> Self {
        Self::new()
    }
}
