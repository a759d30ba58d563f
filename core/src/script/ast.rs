//! Scenario script AST types.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::gamepad::RawButton;
use crate::screen::PointerEvent;
use crate::source::InputSourceDescriptor;

/// Device name that addresses the viewer in `pose` and `lose_tracking`
pub const VIEWER: &str = "viewer";

/// Device name reported for transient screen sources
pub const SCREEN: &str = "screen";

/// Complete scenario script file (TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioScript {
    /// Human-readable scenario name
    #[serde(default)]
    pub name: String,

    /// Devices the frames refer to, in connection-id order
    #[serde(default)]
    pub devices: Vec<DeviceDecl>,

    /// Touch surface for `pointer` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<Surface>,

    /// Frame entries
    #[serde(default)]
    pub frames: Vec<FrameEntry>,
}

/// Named device and the descriptor it connects with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDecl {
    pub name: String,
    #[serde(flatten)]
    pub descriptor: InputSourceDescriptor,
}

/// Pixel size of the touch surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

/// Host input applied before one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameEntry {
    /// Frame number
    pub f: u64,

    /// Devices to connect
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connect: Vec<String>,

    /// Descriptor changes for connected devices
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<DescriptorUpdate>,

    /// Devices to disconnect
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disconnect: Vec<String>,

    /// Pose updates (device name or `viewer`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pose: Vec<PoseInput>,

    /// Devices (or `viewer`) whose tracking is lost
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lose_tracking: Vec<String>,

    /// Gamepad button readings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ButtonInput>,

    /// Gamepad axis readings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<AxisInput>,

    /// Primary action started
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub press: Vec<String>,

    /// Primary action ended normally
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release: Vec<String>,

    /// Primary action aborted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cancel: Vec<String>,

    /// Instantaneous primary action (voice command)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instant: Vec<String>,

    /// Squeeze action started
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub squeeze: Vec<String>,

    /// Squeeze action ended normally
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub squeeze_release: Vec<String>,

    /// Pointer events for the touch surface
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pointer: Vec<PointerEvent>,

    /// Events the tick must produce, in order.
    ///
    /// `"select"` matches any source, `"select:right"` only the named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<Vec<String>>,
}

/// New descriptor for a connected device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorUpdate {
    pub device: String,
    #[serde(flatten)]
    pub descriptor: InputSourceDescriptor,
}

/// Pose of a device's target ray (or grip), or of the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseInput {
    pub device: String,
    /// Pose the grip space instead of the target ray
    #[serde(default)]
    pub grip: bool,
    #[serde(default)]
    pub position: [f32; 3],
    /// Quaternion `[x, y, z, w]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<[f32; 4]>,
}

impl PoseInput {
    pub fn transform(&self) -> Mat4 {
        let rotation = self
            .orientation
            .map(|q| Quat::from_array(q).normalize())
            .unwrap_or(Quat::IDENTITY);
        Mat4::from_rotation_translation(rotation, Vec3::from_array(self.position))
    }
}

/// Button reading for one gamepad slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonInput {
    pub device: String,
    pub index: usize,
    #[serde(default)]
    pub pressed: bool,
    #[serde(default)]
    pub touched: bool,
    /// Analog value; defaults to 1.0 when pressed, else 0.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
}

impl ButtonInput {
    pub fn raw(&self) -> RawButton {
        match self.value {
            Some(value) => RawButton {
                pressed: self.pressed,
                touched: self.touched || value > 0.0,
                value,
            },
            None if self.pressed => RawButton::down(),
            None => RawButton {
                touched: self.touched,
                ..RawButton::default()
            },
        }
    }
}

/// Axis reading for one gamepad slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisInput {
    pub device: String,
    pub index: usize,
    pub value: f32,
}

impl FrameEntry {
    /// Device names used by connection, action and gamepad entries
    pub fn device_refs(&self) -> impl Iterator<Item = &str> {
        let lists = [
            &self.connect,
            &self.disconnect,
            &self.press,
            &self.release,
            &self.cancel,
            &self.instant,
            &self.squeeze,
            &self.squeeze_release,
        ];
        lists
            .into_iter()
            .flatten()
            .map(String::as_str)
            .chain(self.update.iter().map(|u| u.device.as_str()))
            .chain(self.buttons.iter().map(|b| b.device.as_str()))
            .chain(self.axes.iter().map(|a| a.device.as_str()))
    }

    /// Names used by `pose` and `lose_tracking`, which may also be `viewer`
    pub fn tracking_refs(&self) -> impl Iterator<Item = (&str, bool)> {
        self.pose
            .iter()
            .map(|p| (p.device.as_str(), p.grip))
            .chain(self.lose_tracking.iter().map(|d| (d.as_str(), false)))
    }
}

impl ScenarioScript {
    /// Get the maximum frame number in the script
    pub fn max_frame(&self) -> u64 {
        self.frames.iter().map(|f| f.f).max().unwrap_or(0)
    }

    /// Get frames that carry expectations
    pub fn expect_frames(&self) -> impl Iterator<Item = &FrameEntry> {
        self.frames.iter().filter(|f| f.expect.is_some())
    }

    pub fn device(&self, name: &str) -> Option<&DeviceDecl> {
        self.devices.iter().find(|d| d.name == name)
    }
}
