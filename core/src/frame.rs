//! Frame snapshots
//!
//! A frame freezes the tracking state of one tick. Input events carry the
//! frame of the tick that produced them; those frames are not animation
//! frames and report an empty view list.

use glam::{Mat4, Vec3};
use std::sync::Arc;

use crate::pose::Pose;
use crate::space::SpaceId;
use crate::tracking::{PoseResolver, TrackingState};

/// Which eye a view renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

/// One rendered view of the viewer pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub eye: Eye,
    /// Base-from-eye transform
    pub transform: Mat4,
}

/// Viewer pose plus the views to render from it
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerPose {
    pub pose: Pose,
    pub views: Vec<View>,
}

/// Immutable tracking snapshot for one tick
#[derive(Debug, Clone)]
pub struct XrFrame {
    index: u64,
    tracking: Arc<TrackingState>,
    animation: bool,
    ipd: f32,
}

impl XrFrame {
    pub(crate) fn new(index: u64, tracking: Arc<TrackingState>, animation: bool, ipd: f32) -> Self {
        Self {
            index,
            tracking,
            animation,
            ipd,
        }
    }

    /// Same snapshot, exposed as an animation frame with views
    pub(crate) fn to_animation_frame(&self) -> Self {
        Self {
            animation: true,
            ..self.clone()
        }
    }

    /// Tick counter this snapshot belongs to
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Whether this frame was produced for rendering (has views)
    pub fn is_animation_frame(&self) -> bool {
        self.animation
    }

    /// Pose of `space` in `base` at the time of this frame
    pub fn pose(&self, space: SpaceId, base: SpaceId) -> Option<Pose> {
        self.tracking.resolve(space, base)
    }

    /// Viewer pose in `base`. Views are empty unless this is an animation frame.
    pub fn viewer_pose(&self, base: SpaceId) -> Option<ViewerPose> {
        let pose = self.tracking.resolve(self.tracking.viewer(), base)?;
        let views = if self.animation {
            let half = self.ipd / 2.0;
            vec![
                View {
                    eye: Eye::Left,
                    transform: pose.transform * Mat4::from_translation(Vec3::new(-half, 0.0, 0.0)),
                },
                View {
                    eye: Eye::Right,
                    transform: pose.transform * Mat4::from_translation(Vec3::new(half, 0.0, 0.0)),
                },
            ]
        } else {
            Vec::new()
        };
        Some(ViewerPose { pose, views })
    }

    /// Whether two frames share the same frozen tracking data
    pub fn same_snapshot(&self, other: &XrFrame) -> bool {
        self.index == other.index && Arc::ptr_eq(&self.tracking, &other.tracking)
    }
}

impl PoseResolver for XrFrame {
    fn resolve(&self, space: SpaceId, base: SpaceId) -> Option<Pose> {
        self.pose(space, base)
    }
}
