//! Input profile identifiers
//!
//! A device is identified as lower-case `<vendor>-<product>` with any
//! handedness stripped, or `"unknown"` when the identity is indeterminate,
//! masked for privacy, or the session is not immersive.

use serde::{Deserialize, Serialize};

use crate::gamepad::{GamepadCapabilities, GamepadLayout};
use crate::source::TargetRayMode;

/// Identifier reported when the device type cannot or may not be exposed
pub const UNKNOWN_PROFILE: &str = "unknown";

/// Handedness tokens removed from product names
const HANDEDNESS_TOKENS: [&str; 2] = ["left", "right"];

/// Vendor and product names as reported by the device layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl DeviceIdentity {
    pub fn new(vendor: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            vendor: Some(vendor.into()),
            product: Some(product.into()),
        }
    }
}

/// Exposure rules for device identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfilePolicy {
    /// Inline (non-immersive) sessions never expose identity
    pub immersive: bool,
    /// User agent chose to hide the device type
    pub mask_identity: bool,
}

impl Default for ProfilePolicy {
    fn default() -> Self {
        Self {
            immersive: true,
            mask_identity: false,
        }
    }
}

/// Lower-case, dash-separated form of a name; empty if nothing usable remains
fn sanitize(name: &str, strip_handedness: bool) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .filter(|token| !(strip_handedness && HANDEDNESS_TOKENS.contains(&token.as_str())))
        .collect::<Vec<_>>()
        .join("-")
}

/// Device identifier string
pub fn identifier(identity: &DeviceIdentity, policy: ProfilePolicy) -> String {
    if !policy.immersive || policy.mask_identity {
        return UNKNOWN_PROFILE.to_string();
    }
    let vendor = identity
        .vendor
        .as_deref()
        .map(|v| sanitize(v, false))
        .unwrap_or_default();
    let product = identity
        .product
        .as_deref()
        .map(|p| sanitize(p, true))
        .unwrap_or_default();
    if vendor.is_empty() || product.is_empty() {
        return UNKNOWN_PROFILE.to_string();
    }
    format!("{}-{}", vendor, product)
}

/// Generic fallback profile describing the device's capabilities
pub fn generic_profile(mode: TargetRayMode, layout: Option<&GamepadLayout>) -> String {
    match (mode, layout) {
        (TargetRayMode::Screen, _) => "generic-touchscreen".to_string(),
        (_, None) => "generic-hand-select".to_string(),
        (_, Some(layout)) => {
            let mut profile = String::from("generic-trigger");
            for (flag, suffix) in [
                (GamepadCapabilities::SQUEEZE, "-squeeze"),
                (GamepadCapabilities::TOUCHPAD, "-touchpad"),
                (GamepadCapabilities::THUMBSTICK, "-thumbstick"),
            ] {
                if layout.capabilities.contains(flag) {
                    profile.push_str(suffix);
                }
            }
            profile
        }
    }
}

/// Ordered profile list, most specific first.
///
/// Inline sessions expose no profiles. Masked or indeterminate devices
/// expose only the generic profile.
pub fn profiles(
    identity: &DeviceIdentity,
    mode: TargetRayMode,
    layout: Option<&GamepadLayout>,
    policy: ProfilePolicy,
) -> Vec<String> {
    if !policy.immersive {
        return Vec::new();
    }
    let generic = generic_profile(mode, layout);
    match identifier(identity, policy) {
        id if id == UNKNOWN_PROFILE => vec![generic],
        id => vec![id, generic],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_lowercases_and_joins() {
        let identity = DeviceIdentity::new("Oculus", "Touch v2");
        assert_eq!(identifier(&identity, ProfilePolicy::default()), "oculus-touch-v2");
    }

    #[test]
    fn test_identifier_strips_handedness() {
        let identity = DeviceIdentity::new("Valve", "Index Controller (Left)");
        assert_eq!(
            identifier(&identity, ProfilePolicy::default()),
            "valve-index-controller"
        );
    }

    #[test]
    fn test_identifier_unknown_when_indeterminate() {
        let identity = DeviceIdentity {
            vendor: Some("htc".into()),
            product: None,
        };
        assert_eq!(identifier(&identity, ProfilePolicy::default()), UNKNOWN_PROFILE);
        assert_eq!(
            identifier(&DeviceIdentity::new("", "!!"), ProfilePolicy::default()),
            UNKNOWN_PROFILE
        );
    }

    #[test]
    fn test_identifier_unknown_when_masked_or_inline() {
        let identity = DeviceIdentity::new("htc", "vive");
        let masked = ProfilePolicy {
            immersive: true,
            mask_identity: true,
        };
        let inline = ProfilePolicy {
            immersive: false,
            mask_identity: false,
        };
        assert_eq!(identifier(&identity, masked), UNKNOWN_PROFILE);
        assert_eq!(identifier(&identity, inline), UNKNOWN_PROFILE);
    }

    #[test]
    fn test_generic_profiles() {
        let full = GamepadLayout::full();
        assert_eq!(
            generic_profile(TargetRayMode::TrackedPointer, Some(&full)),
            "generic-trigger-squeeze-touchpad-thumbstick"
        );
        assert_eq!(
            generic_profile(TargetRayMode::TrackedPointer, Some(&GamepadLayout::default())),
            "generic-trigger"
        );
        assert_eq!(generic_profile(TargetRayMode::Gaze, None), "generic-hand-select");
        assert_eq!(generic_profile(TargetRayMode::Screen, None), "generic-touchscreen");
    }

    #[test]
    fn test_profile_lists() {
        let identity = DeviceIdentity::new("htc", "vive");
        let layout = GamepadLayout::full();
        let list = profiles(
            &identity,
            TargetRayMode::TrackedPointer,
            Some(&layout),
            ProfilePolicy::default(),
        );
        assert_eq!(list[0], "htc-vive");
        assert_eq!(list.len(), 2);

        let masked = ProfilePolicy {
            immersive: true,
            mask_identity: true,
        };
        let list = profiles(&identity, TargetRayMode::TrackedPointer, Some(&layout), masked);
        assert_eq!(list, vec!["generic-trigger-squeeze-touchpad-thumbstick".to_string()]);

        let inline = ProfilePolicy {
            immersive: false,
            mask_identity: false,
        };
        assert!(profiles(&identity, TargetRayMode::Screen, None, inline).is_empty());
    }
}
