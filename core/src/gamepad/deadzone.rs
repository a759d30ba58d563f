//! Deadzone application for analog inputs
//!
//! Non-finite readings are treated as a control at rest.

/// Apply a deadzone to a single stick or touchpad axis (-1.0..=1.0)
pub fn apply_stick_deadzone(value: f32, deadzone: f32) -> f32 {
    if !value.is_finite() || value.abs() <= deadzone {
        0.0
    } else {
        // Scale to full range after deadzone
        let sign = value.signum();
        let magnitude = (value.abs() - deadzone) / (1.0 - deadzone);
        sign * magnitude.clamp(0.0, 1.0)
    }
}

/// Apply a deadzone to an analog trigger (0.0..=1.0)
pub fn apply_trigger_deadzone(value: f32, deadzone: f32) -> f32 {
    if !value.is_finite() || value <= deadzone {
        0.0
    } else {
        ((value - deadzone) / (1.0 - deadzone)).clamp(0.0, 1.0)
    }
}
