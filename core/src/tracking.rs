//! Tracking state and pose resolution
//!
//! Every space is a node holding an optional parent-from-space transform.
//! Root nodes are expressed in the tracking origin. Resolving a pose walks
//! both spaces up to the origin and composes the result; any missing link
//! makes the pose unavailable.

use glam::{Mat4, Vec3};
use hashbrown::HashMap;
use tracing::debug;

use crate::pose::Pose;
use crate::source::InputSourceId;
use crate::space::{ReferenceSpaceType, SpaceId, SpaceKind};

/// Parent chains longer than this are treated as unresolvable
const MAX_SPACE_DEPTH: usize = 16;

/// Relative pose lookup between two spaces.
///
/// Absence is a normal outcome (tracking lost, source disconnected, no
/// relation between the spaces) and is never reported as an error.
pub trait PoseResolver {
    /// Pose of `space` expressed in `base`, or `None` if unavailable
    fn resolve(&self, space: SpaceId, base: SpaceId) -> Option<Pose>;
}

/// One node in the space graph
#[derive(Debug, Clone)]
struct SpaceNode {
    kind: SpaceKind,
    parent: Option<SpaceId>,
    /// Parent-from-space transform; `None` while tracking is lost
    transform: Option<Mat4>,
    emulated_position: bool,
    owner: Option<InputSourceId>,
}

/// Current tracking data for every live space
#[derive(Debug, Clone)]
pub struct TrackingState {
    spaces: HashMap<SpaceId, SpaceNode>,
    viewer: SpaceId,
    next_space: u32,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingState {
    /// New tracking state with an untracked viewer space
    pub fn new() -> Self {
        let mut state = Self {
            spaces: HashMap::new(),
            viewer: SpaceId(0),
            next_space: 0,
        };
        state.viewer = state.insert(SpaceNode {
            kind: SpaceKind::Reference(ReferenceSpaceType::Viewer),
            parent: None,
            transform: None,
            emulated_position: false,
            owner: None,
        });
        state
    }

    fn insert(&mut self, node: SpaceNode) -> SpaceId {
        let id = SpaceId(self.next_space);
        self.next_space += 1;
        self.spaces.insert(id, node);
        id
    }

    /// The viewer reference space
    pub fn viewer(&self) -> SpaceId {
        self.viewer
    }

    /// Create a reference space. The viewer type returns the shared viewer space.
    pub fn create_reference_space(
        &mut self,
        kind: ReferenceSpaceType,
        floor_height: f32,
        floor_emulated: bool,
    ) -> SpaceId {
        let (transform, emulated_position) = match kind {
            ReferenceSpaceType::Viewer => return self.viewer,
            ReferenceSpaceType::Local | ReferenceSpaceType::Unbounded => (Mat4::IDENTITY, false),
            ReferenceSpaceType::LocalFloor | ReferenceSpaceType::BoundedFloor => (
                Mat4::from_translation(Vec3::new(0.0, -floor_height, 0.0)),
                floor_emulated,
            ),
        };
        self.insert(SpaceNode {
            kind: SpaceKind::Reference(kind),
            parent: None,
            transform: Some(transform),
            emulated_position,
            owner: None,
        })
    }

    /// Create a space whose origin is offset from `base`
    pub fn create_offset_space(&mut self, base: SpaceId, origin_offset: Mat4) -> Option<SpaceId> {
        if !self.spaces.contains_key(&base) {
            return None;
        }
        Some(self.insert(SpaceNode {
            kind: SpaceKind::Offset,
            parent: Some(base),
            transform: Some(origin_offset),
            emulated_position: false,
            owner: None,
        }))
    }

    /// Create an untracked input source space
    pub(crate) fn create_source_space(
        &mut self,
        kind: SpaceKind,
        owner: InputSourceId,
        parent: Option<SpaceId>,
    ) -> SpaceId {
        self.insert(SpaceNode {
            kind,
            parent,
            transform: None,
            emulated_position: false,
            owner: Some(owner),
        })
    }

    /// Update a space's parent-from-space transform. `None` marks tracking as lost.
    ///
    /// Returns false if the space is unknown.
    pub fn set_transform(
        &mut self,
        space: SpaceId,
        transform: Option<Mat4>,
        emulated_position: bool,
    ) -> bool {
        match self.spaces.get_mut(&space) {
            Some(node) => {
                node.transform = transform;
                node.emulated_position = emulated_position;
                true
            }
            None => false,
        }
    }

    /// Drop every space owned by a source that has left the session
    pub(crate) fn remove_owned_by(&mut self, owner: InputSourceId) {
        let before = self.spaces.len();
        self.spaces.retain(|_, node| node.owner != Some(owner));
        debug!(
            "Removed {} spaces owned by {}",
            before - self.spaces.len(),
            owner
        );
    }

    pub fn contains(&self, space: SpaceId) -> bool {
        self.spaces.contains_key(&space)
    }

    pub fn kind(&self, space: SpaceId) -> Option<SpaceKind> {
        self.spaces.get(&space).map(|node| node.kind)
    }

    /// Origin-from-space transform and accumulated emulation flag
    fn origin_from(&self, space: SpaceId) -> Option<(Mat4, bool)> {
        let mut current = space;
        let mut transform = Mat4::IDENTITY;
        let mut emulated = false;
        for _ in 0..MAX_SPACE_DEPTH {
            let node = self.spaces.get(&current)?;
            transform = node.transform? * transform;
            emulated |= node.emulated_position;
            match node.parent {
                Some(parent) => current = parent,
                None => return Some((transform, emulated)),
            }
        }
        None
    }
}

impl PoseResolver for TrackingState {
    fn resolve(&self, space: SpaceId, base: SpaceId) -> Option<Pose> {
        let (origin_from_space, space_emulated) = self.origin_from(space)?;
        let (origin_from_base, base_emulated) = self.origin_from(base)?;
        Some(Pose {
            transform: origin_from_base.inverse() * origin_from_space,
            emulated_position: space_emulated || base_emulated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_untracked_viewer_is_unavailable() {
        let mut state = TrackingState::new();
        let local = state.create_reference_space(ReferenceSpaceType::Local, 1.6, true);
        assert!(state.resolve(state.viewer(), local).is_none());
    }

    #[test]
    fn test_resolve_between_reference_spaces() {
        let mut state = TrackingState::new();
        let local = state.create_reference_space(ReferenceSpaceType::Local, 1.6, true);
        let floor = state.create_reference_space(ReferenceSpaceType::LocalFloor, 1.6, true);

        // The local origin sits 1.6m above the floor origin
        let pose = state.resolve(local, floor).unwrap();
        assert!(approx(pose.position(), Vec3::new(0.0, 1.6, 0.0)));
        assert!(pose.emulated_position);

        let pose = state.resolve(local, local).unwrap();
        assert_eq!(pose.transform, Mat4::IDENTITY);
        assert!(!pose.emulated_position);
    }

    #[test]
    fn test_viewer_space_is_shared() {
        let mut state = TrackingState::new();
        let viewer = state.create_reference_space(ReferenceSpaceType::Viewer, 0.0, false);
        assert_eq!(viewer, state.viewer());
    }

    #[test]
    fn test_parented_space_composes() {
        let mut state = TrackingState::new();
        let local = state.create_reference_space(ReferenceSpaceType::Local, 1.6, false);
        let viewer = state.viewer();
        state.set_transform(
            viewer,
            Some(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0))),
            false,
        );
        let child = state.create_source_space(SpaceKind::TargetRay, InputSourceId(7), Some(viewer));
        state.set_transform(
            child,
            Some(Mat4::from_translation(Vec3::new(0.0, 0.0, -0.1))),
            true,
        );

        let pose = state.resolve(child, local).unwrap();
        assert!(approx(pose.position(), Vec3::new(0.0, 1.0, -0.1)));
        assert!(pose.emulated_position);
    }

    #[test]
    fn test_lost_tracking_and_removed_owner() {
        let mut state = TrackingState::new();
        let local = state.create_reference_space(ReferenceSpaceType::Local, 1.6, false);
        let owner = InputSourceId(3);
        let grip = state.create_source_space(SpaceKind::Grip, owner, None);
        assert!(state.resolve(grip, local).is_none());

        state.set_transform(grip, Some(Mat4::IDENTITY), false);
        assert!(state.resolve(grip, local).is_some());

        state.set_transform(grip, None, false);
        assert!(state.resolve(grip, local).is_none());

        state.set_transform(grip, Some(Mat4::IDENTITY), false);
        state.remove_owned_by(owner);
        assert!(!state.contains(grip));
        assert!(state.resolve(grip, local).is_none());
    }

    #[test]
    fn test_offset_space() {
        let mut state = TrackingState::new();
        let local = state.create_reference_space(ReferenceSpaceType::Local, 0.0, false);
        let offset = state
            .create_offset_space(local, Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        // Local origin seen from an origin shifted +2 on X
        let pose = state.resolve(local, offset).unwrap();
        assert!(approx(pose.position(), Vec3::new(-2.0, 0.0, 0.0)));
        assert!(state.create_offset_space(SpaceId(999), Mat4::IDENTITY).is_none());
    }
}
