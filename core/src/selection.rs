//! Primary action lifecycle
//!
//! One machine per input source and action kind. A machine never emits
//! events itself; it returns the phases a transition produces and the
//! session turns them into events in that order.

use smallvec::{SmallVec, smallvec};
use tracing::debug;

/// Which lifecycle a machine tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Primary action (trigger, tap, voice command)
    Select,
    /// Grip action
    Squeeze,
}

/// Lifecycle notification produced by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    /// `selectstart` / `squeezestart`
    Start,
    /// `selectend` / `squeezeend`
    End,
    /// `select` / `squeeze`
    Complete,
}

/// Phases emitted by one transition, in dispatch order
pub type Phases = SmallVec<[ActionPhase; 3]>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Active,
}

/// Per-source action state machine
#[derive(Debug, Clone, Default)]
pub struct SelectionStateMachine {
    state: SelectionState,
    /// Ended cleanly, completion deferred to a later `complete()`
    completion_pending: bool,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SelectionState::Active
    }

    /// Waiting for a deferred completion
    pub fn completion_pending(&self) -> bool {
        self.completion_pending
    }

    /// `Idle → Active`
    pub fn begin(&mut self) -> Phases {
        match self.state {
            SelectionState::Idle => {
                self.state = SelectionState::Active;
                self.completion_pending = false;
                smallvec![ActionPhase::Start]
            }
            SelectionState::Active => {
                debug!("Ignoring action begin while already active");
                Phases::new()
            }
        }
    }

    /// `Active → Idle` with completion in the same tick
    pub fn end(&mut self) -> Phases {
        match self.state {
            SelectionState::Active => {
                self.state = SelectionState::Idle;
                smallvec![ActionPhase::End, ActionPhase::Complete]
            }
            SelectionState::Idle => Phases::new(),
        }
    }

    /// `Active → Idle`, completion delivered later by [`complete`](Self::complete)
    pub fn end_deferred(&mut self) -> Phases {
        match self.state {
            SelectionState::Active => {
                self.state = SelectionState::Idle;
                self.completion_pending = true;
                smallvec![ActionPhase::End]
            }
            SelectionState::Idle => Phases::new(),
        }
    }

    /// Deliver a deferred completion, at most once
    pub fn complete(&mut self) -> Phases {
        if std::mem::take(&mut self.completion_pending) {
            smallvec![ActionPhase::Complete]
        } else {
            Phases::new()
        }
    }

    /// Forced `Active → Idle` (disconnect, cancellation). Never completes.
    pub fn cancel(&mut self) -> Phases {
        self.completion_pending = false;
        match self.state {
            SelectionState::Active => {
                self.state = SelectionState::Idle;
                smallvec![ActionPhase::End]
            }
            SelectionState::Idle => Phases::new(),
        }
    }

    /// Action with no distinguishable start and end
    pub fn instantaneous(&mut self) -> Phases {
        match self.state {
            SelectionState::Idle => {
                self.completion_pending = false;
                smallvec![ActionPhase::Start, ActionPhase::End, ActionPhase::Complete]
            }
            SelectionState::Active => {
                debug!("Ignoring instantaneous action while already active");
                Phases::new()
            }
        }
    }
}
