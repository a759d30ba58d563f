//! Events delivered at frame boundaries

use std::sync::Arc;

use crate::frame::XrFrame;
use crate::selection::{ActionKind, ActionPhase};
use crate::source::InputSource;

/// Button index for actions not tied to a discrete control
pub const NO_BUTTON: i32 = -1;

/// Lifecycle events of an input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEventKind {
    SelectStart,
    SelectEnd,
    Select,
    SqueezeStart,
    SqueezeEnd,
    Squeeze,
}

impl InputEventKind {
    pub fn new(kind: ActionKind, phase: ActionPhase) -> Self {
        match (kind, phase) {
            (ActionKind::Select, ActionPhase::Start) => Self::SelectStart,
            (ActionKind::Select, ActionPhase::End) => Self::SelectEnd,
            (ActionKind::Select, ActionPhase::Complete) => Self::Select,
            (ActionKind::Squeeze, ActionPhase::Start) => Self::SqueezeStart,
            (ActionKind::Squeeze, ActionPhase::End) => Self::SqueezeEnd,
            (ActionKind::Squeeze, ActionPhase::Complete) => Self::Squeeze,
        }
    }

    /// Event type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectStart => "selectstart",
            Self::SelectEnd => "selectend",
            Self::Select => "select",
            Self::SqueezeStart => "squeezestart",
            Self::SqueezeEnd => "squeezeend",
            Self::Squeeze => "squeeze",
        }
    }
}

/// A lifecycle event for one input source
#[derive(Debug, Clone)]
pub struct InputSourceEvent {
    pub kind: InputEventKind,
    /// Source that triggered the event (may already be removed)
    pub source: Arc<InputSource>,
    /// Tracking snapshot at trigger time
    pub frame: XrFrame,
    /// Gamepad button that caused the event, or [`NO_BUTTON`]
    pub button_index: i32,
}

/// Added and removed sources since the previous notification
#[derive(Debug, Clone, Default)]
pub struct InputSourcesChangeEvent {
    pub added: Vec<Arc<InputSource>>,
    pub removed: Vec<Arc<InputSource>>,
}

impl InputSourcesChangeEvent {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Any event produced by a session tick
#[derive(Debug, Clone)]
pub enum XrEvent {
    InputSourcesChange(InputSourcesChangeEvent),
    InputSource(InputSourceEvent),
}

impl XrEvent {
    /// Event type name
    pub fn name(&self) -> &'static str {
        match self {
            Self::InputSourcesChange(_) => "inputsourceschange",
            Self::InputSource(event) => event.kind.as_str(),
        }
    }

    pub fn as_input_source_event(&self) -> Option<&InputSourceEvent> {
        match self {
            Self::InputSource(event) => Some(event),
            Self::InputSourcesChange(_) => None,
        }
    }
}

/// Caller-owned "last used input source" tracking.
///
/// Updated from `selectstart` events; forgets a source once it is removed.
#[derive(Debug, Clone, Default)]
pub struct LastInputSource {
    source: Option<Arc<InputSource>>,
}

impl LastInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed every dispatched event through here
    pub fn observe(&mut self, event: &XrEvent) {
        match event {
            XrEvent::InputSource(event) if event.kind == InputEventKind::SelectStart => {
                self.source = Some(event.source.clone());
            }
            XrEvent::InputSourcesChange(change) => {
                let removed = self
                    .source
                    .as_ref()
                    .is_some_and(|current| change.removed.iter().any(|r| r == current));
                if removed {
                    self.source = None;
                }
            }
            _ => {}
        }
    }

    pub fn get(&self) -> Option<&Arc<InputSource>> {
        self.source.as_ref()
    }
}
