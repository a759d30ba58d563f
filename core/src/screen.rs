//! Screen input adapter
//!
//! Turns pointer events on a 2D surface into a transient `screen` input
//! source. The target ray starts where the touch point projects onto the
//! near plane and points away from the camera through that point.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScreenConfig;
use crate::error::InputError;
use crate::pose::XrRay;
use crate::selection::ActionKind;
use crate::session::XrInputSession;
use crate::source::{DeviceId, InputSourceDescriptor, InputSourceId};

/// Pointer event types understood by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
    Click,
}

/// Pointer event in surface pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    #[serde(default)]
    pub pointer_id: u32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Pointer currently driving a transient source
#[derive(Debug, Clone, Copy)]
struct ActivePointer {
    pointer_id: u32,
    device: DeviceId,
}

/// Source released by a pointer, waiting for that pointer's click
#[derive(Debug, Clone, Copy)]
struct ReleasedPointer {
    pointer_id: u32,
    source: InputSourceId,
}

/// One screen input source per surface
#[derive(Debug)]
pub struct ScreenInputAdapter {
    width: f32,
    height: f32,
    inverse_projection: Mat4,
    active: Option<ActivePointer>,
    released: Option<ReleasedPointer>,
}

impl ScreenInputAdapter {
    /// Adapter for a surface of `width` x `height` pixels
    pub fn new(width: u32, height: u32, config: &ScreenConfig) -> Self {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        let projection = Mat4::perspective_rh(
            config.fov_y_degrees.to_radians(),
            width / height,
            config.near,
            config.far,
        );
        Self {
            width,
            height,
            inverse_projection: projection.inverse(),
            active: None,
            released: None,
        }
    }

    /// Device driving the active transient source, if any
    pub fn active_device(&self) -> Option<DeviceId> {
        self.active.map(|active| active.device)
    }

    /// Viewer-relative target ray for a surface point
    pub fn target_ray(&self, x: f32, y: f32) -> XrRay {
        let ndc = Vec3::new(
            2.0 * x / self.width - 1.0,
            1.0 - 2.0 * y / self.height,
            0.0,
        );
        let near_point = self.inverse_projection.project_point3(ndc);
        XrRay::new(near_point, near_point).unwrap_or_default()
    }

    fn is_active_pointer(&self, event: &PointerEvent) -> Option<DeviceId> {
        self.active
            .filter(|active| active.pointer_id == event.pointer_id)
            .map(|active| active.device)
    }

    /// Feed one pointer event into the session
    pub fn handle(
        &mut self,
        session: &mut XrInputSession,
        event: &PointerEvent,
    ) -> Result<(), InputError> {
        match event.kind {
            PointerEventKind::Down => {
                if let Some(active) = self.active {
                    debug!(
                        "Ignoring pointer {} while pointer {} is active",
                        event.pointer_id, active.pointer_id
                    );
                    return Ok(());
                }
                if let Some(stale) = self.released.take() {
                    session.discard_completion(stale.source);
                }
                let device = session.allocate_transient_device();
                session.connect(device, InputSourceDescriptor::screen())?;
                session.set_target_ray_pose(device, Some(self.target_ray(event.x, event.y).matrix()))?;
                session.begin_action(device, ActionKind::Select)?;
                self.active = Some(ActivePointer {
                    pointer_id: event.pointer_id,
                    device,
                });
            }
            PointerEventKind::Move => {
                if let Some(device) = self.is_active_pointer(event) {
                    session.set_target_ray_pose(
                        device,
                        Some(self.target_ray(event.x, event.y).matrix()),
                    )?;
                }
            }
            PointerEventKind::Up => {
                if let Some(device) = self.is_active_pointer(event) {
                    let source = session.source(device).ok_or(InputError::UnknownDevice(device))?;
                    session.end_action_deferred(device)?;
                    session.disconnect(device)?;
                    self.released = Some(ReleasedPointer {
                        pointer_id: event.pointer_id,
                        source: source.id(),
                    });
                    self.active = None;
                }
            }
            PointerEventKind::Cancel => {
                if let Some(device) = self.is_active_pointer(event) {
                    session.cancel_action(device, ActionKind::Select)?;
                    session.disconnect(device)?;
                    self.active = None;
                }
            }
            PointerEventKind::Click => match self.released {
                Some(released) if released.pointer_id == event.pointer_id => {
                    self.released = None;
                    session.complete_selection(released.source)?;
                }
                Some(released) => debug!(
                    "Ignoring click from pointer {} while pointer {} awaits completion",
                    event.pointer_id, released.pointer_id
                ),
                None => debug!("Ignoring click without a released screen source"),
            },
        }
        Ok(())
    }
}
