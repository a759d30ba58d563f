//! Space handles and reference space types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle used as a key into the pose resolver.
///
/// A space carries no data beyond its identity; transforms live in
/// [`TrackingState`](crate::tracking::TrackingState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpaceId(pub(crate) u32);

impl SpaceId {
    /// Raw handle value
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "space#{}", self.0)
    }
}

/// Reference space types a session can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpaceType {
    /// Tracks the viewer (head) pose
    Viewer,
    /// Origin near the viewer position at session start
    Local,
    /// Like `Local`, with the origin on the floor
    LocalFloor,
    /// Floor-level origin inside a bounded play area
    BoundedFloor,
    /// Origin fixed in the world, unlimited range
    Unbounded,
}

impl ReferenceSpaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Local => "local",
            Self::LocalFloor => "local-floor",
            Self::BoundedFloor => "bounded-floor",
            Self::Unbounded => "unbounded",
        }
    }
}

/// What a space represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    /// A session reference space
    Reference(ReferenceSpaceType),
    /// Reference space with an extra origin offset
    Offset,
    /// Target ray of an input source
    TargetRay,
    /// Grip of an input source
    Grip,
}
