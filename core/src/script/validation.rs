//! Scenario script validation.

use hashbrown::HashSet;

use super::ScriptError;
use super::ast::{SCREEN, ScenarioScript, VIEWER};

/// Validate a parsed scenario before running it.
pub fn validate_script(script: &ScenarioScript) -> Result<(), ScriptError> {
    let mut names = HashSet::new();
    for device in &script.devices {
        if device.name == VIEWER || device.name == SCREEN {
            return Err(ScriptError::ReservedDeviceName(device.name.clone()));
        }
        if !names.insert(device.name.as_str()) {
            return Err(ScriptError::DuplicateDevice(device.name.clone()));
        }
    }

    let mut frames = HashSet::new();
    for entry in &script.frames {
        if !frames.insert(entry.f) {
            return Err(ScriptError::DuplicateFrame(entry.f));
        }

        if !entry.pointer.is_empty() && script.surface.is_none() {
            return Err(ScriptError::PointerWithoutSurface(entry.f));
        }

        let undefined = |device: &str| ScriptError::UndefinedDevice {
            frame: entry.f,
            device: device.to_string(),
        };
        if let Some(device) = entry.device_refs().find(|d| !names.contains(d)) {
            return Err(undefined(device));
        }
        // The viewer has a pose but no grip
        let tracked = |(device, grip): &(&str, bool)| {
            names.contains(device) || (*device == VIEWER && !grip)
        };
        if let Some((device, _)) = entry.tracking_refs().find(|r| !tracked(r)) {
            return Err(undefined(device));
        }
    }

    Ok(())
}
