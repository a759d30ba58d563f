//! Frame-synchronous input session
//!
//! The host mutates device state between ticks (connections, button and
//! axis readings, poses, action edges). Nothing becomes visible to callers
//! until [`XrInputSession::tick`], which publishes one frame and returns
//! its events in a fixed order:
//!
//! 1. Retired sources with a deferred completion (screen clicks).
//! 2. Sources published in the previous frame, in enumeration order: their
//!    queued actions, then forced ends if they are being removed.
//! 3. At most one `inputsourceschange`.
//! 4. Sources created during this frame, in creation order.
//!
//! Within one source, events keep the order their actions were queued in.

use glam::Mat4;
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::InputError;
use crate::event::{InputEventKind, InputSourceEvent, NO_BUTTON, XrEvent};
use crate::frame::XrFrame;
use crate::gamepad::{BUTTON_SQUEEZE, BUTTON_TRIGGER, RawButton};
use crate::registry::{ChangeListener, InputSourceRegistry};
use crate::selection::{ActionKind, Phases, SelectionStateMachine};
use crate::source::{
    DeviceId, InputSource, InputSourceDescriptor, InputSourceId, TargetRayMode, TrackingLevel,
};
use crate::space::{ReferenceSpaceType, SpaceId, SpaceKind};
use crate::tracking::TrackingState;

/// First device id handed out for transient (screen) sources
const TRANSIENT_DEVICE_BASE: u32 = 0x8000_0000;

/// Transition requested for an action machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOp {
    Begin,
    End,
    /// End now, complete later
    EndDeferred,
    /// Deliver a deferred completion
    Complete,
    Cancel,
    Instant,
}

/// Action queued for the next tick
#[derive(Debug, Clone, Copy)]
struct PendingAction {
    source: InputSourceId,
    kind: ActionKind,
    op: ActionOp,
    button_index: i32,
}

/// Select and squeeze machines of one source
#[derive(Debug, Clone)]
struct SourceActions {
    select: SelectionStateMachine,
    squeeze: SelectionStateMachine,
    /// Button that started the current select / squeeze
    select_button: i32,
    squeeze_button: i32,
    /// Deferred completion will never be delivered
    completion_discarded: bool,
}

impl Default for SourceActions {
    fn default() -> Self {
        Self {
            select: SelectionStateMachine::default(),
            squeeze: SelectionStateMachine::default(),
            select_button: NO_BUTTON,
            squeeze_button: NO_BUTTON,
            completion_discarded: false,
        }
    }
}

impl SourceActions {
    fn machine(&mut self, kind: ActionKind) -> &mut SelectionStateMachine {
        match kind {
            ActionKind::Select => &mut self.select,
            ActionKind::Squeeze => &mut self.squeeze,
        }
    }

    fn started_by(&mut self, kind: ActionKind) -> &mut i32 {
        match kind {
            ActionKind::Select => &mut self.select_button,
            ActionKind::Squeeze => &mut self.squeeze_button,
        }
    }
}

/// Removed source kept alive until its deferred completion arrives
struct RetiredSource {
    source: Arc<InputSource>,
    select: SelectionStateMachine,
}

/// Gamepad readings received since the last tick
#[derive(Debug, Default)]
struct GamepadInput {
    buttons: Vec<(usize, RawButton)>,
    axes: Vec<(usize, f32)>,
}

/// Input sources, selection state and tracking for one XR session
pub struct XrInputSession {
    config: Config,
    registry: InputSourceRegistry,
    tracking: Arc<TrackingState>,
    reference_spaces: HashMap<ReferenceSpaceType, SpaceId>,
    actions: HashMap<InputSourceId, SourceActions>,
    retired: Vec<RetiredSource>,
    pending_actions: Vec<PendingAction>,
    pending_gamepad: HashMap<DeviceId, GamepadInput>,
    frame: XrFrame,
    next_transient: u32,
}

impl XrInputSession {
    pub fn new(config: Config) -> Self {
        let tracking = Arc::new(TrackingState::new());
        let frame = XrFrame::new(0, tracking.clone(), false, config.tracking.ipd);
        Self {
            config,
            registry: InputSourceRegistry::new(),
            tracking,
            reference_spaces: HashMap::new(),
            actions: HashMap::new(),
            retired: Vec::new(),
            pending_actions: Vec::new(),
            pending_gamepad: HashMap::new(),
            frame,
            next_transient: TRANSIENT_DEVICE_BASE,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Input sources published at the last frame boundary
    pub fn input_sources(&self) -> &[Arc<InputSource>] {
        self.registry.list()
    }

    /// Live source of a device, including changes not yet published
    pub fn source(&self, device: DeviceId) -> Option<Arc<InputSource>> {
        self.registry.get(device).cloned()
    }

    /// Register a listener for `inputsourceschange` notifications
    pub fn subscribe(&mut self, listener: ChangeListener) {
        self.registry.subscribe(listener);
    }

    /// Snapshot of the last tick, as carried by its events
    pub fn frame(&self) -> &XrFrame {
        &self.frame
    }

    /// Snapshot of the last tick with viewer views, for rendering
    pub fn animation_frame(&self) -> XrFrame {
        self.frame.to_animation_frame()
    }

    /// The viewer reference space
    pub fn viewer_space(&self) -> SpaceId {
        self.tracking.viewer()
    }

    /// Reference space of the given type, created on first request
    pub fn reference_space(&mut self, kind: ReferenceSpaceType) -> SpaceId {
        if let Some(&space) = self.reference_spaces.get(&kind) {
            return space;
        }
        let tracking = &self.config.tracking;
        let space = Arc::make_mut(&mut self.tracking).create_reference_space(
            kind,
            tracking.floor_height,
            tracking.floor_height_emulated,
        );
        self.reference_spaces.insert(kind, space);
        space
    }

    /// New space whose origin is `origin_offset` relative to `base`
    pub fn offset_reference_space(
        &mut self,
        base: SpaceId,
        origin_offset: Mat4,
    ) -> Result<SpaceId, InputError> {
        Arc::make_mut(&mut self.tracking)
            .create_offset_space(base, origin_offset)
            .ok_or(InputError::UnknownSpace(base.raw()))
    }

    // ========================================================================
    // Devices
    // ========================================================================

    fn build_source(&mut self, device: DeviceId, descriptor: &InputSourceDescriptor) -> InputSource {
        let id = self.registry.allocate_id();
        let viewer = self.tracking.viewer();
        let tracking = Arc::make_mut(&mut self.tracking);

        let target_ray_space = match descriptor.target_ray_mode {
            TargetRayMode::Gaze => {
                let space = tracking.create_source_space(SpaceKind::TargetRay, id, Some(viewer));
                tracking.set_transform(space, Some(Mat4::IDENTITY), false);
                space
            }
            TargetRayMode::Screen => {
                tracking.create_source_space(SpaceKind::TargetRay, id, Some(viewer))
            }
            TargetRayMode::TrackedPointer => {
                tracking.create_source_space(SpaceKind::TargetRay, id, None)
            }
        };
        let grip_space = descriptor
            .has_grip()
            .then(|| tracking.create_source_space(SpaceKind::Grip, id, None));

        self.actions.insert(id, SourceActions::default());
        InputSource::new(
            id,
            device,
            descriptor,
            target_ray_space,
            grip_space,
            self.config.input.profile_policy(),
        )
    }

    /// Connect a device. Its source appears at the next tick.
    pub fn connect(
        &mut self,
        device: DeviceId,
        descriptor: InputSourceDescriptor,
    ) -> Result<Arc<InputSource>, InputError> {
        if self.registry.get(device).is_some() {
            return Err(InputError::DuplicateDevice(device));
        }
        let source = self.build_source(device, &descriptor);
        self.registry.insert(descriptor, source)
    }

    /// Change a device's description.
    ///
    /// An identical descriptor is a no-op. Any difference retires the
    /// current source and creates a new one with a fresh identity.
    pub fn update(
        &mut self,
        device: DeviceId,
        descriptor: InputSourceDescriptor,
    ) -> Result<Arc<InputSource>, InputError> {
        match self.registry.descriptor(device) {
            None => return Err(InputError::UnknownDevice(device)),
            Some(current) if *current == descriptor => {
                return self
                    .registry
                    .get(device)
                    .cloned()
                    .ok_or(InputError::UnknownDevice(device));
            }
            Some(_) => {}
        }
        let source = self.build_source(device, &descriptor);
        let id = source.id();
        self.registry.replace(descriptor, source)?;
        self.registry
            .get(device)
            .filter(|source| source.id() == id)
            .cloned()
            .ok_or(InputError::UnknownDevice(device))
    }

    /// Disconnect a device. Active actions end without completing at the next tick.
    pub fn disconnect(&mut self, device: DeviceId) -> Result<(), InputError> {
        self.registry.remove(device)?;
        self.pending_gamepad.remove(&device);
        Ok(())
    }

    /// Unused device id for a transient source
    pub fn allocate_transient_device(&mut self) -> DeviceId {
        loop {
            let device = DeviceId(self.next_transient);
            self.next_transient = self.next_transient.wrapping_add(1).max(TRANSIENT_DEVICE_BASE);
            if self.registry.get(device).is_none() {
                return device;
            }
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    fn queue(
        &mut self,
        device: DeviceId,
        kind: ActionKind,
        op: ActionOp,
        button_index: i32,
    ) -> Result<(), InputError> {
        let source = self
            .registry
            .get(device)
            .ok_or(InputError::UnknownDevice(device))?;
        self.pending_actions.push(PendingAction {
            source: source.id(),
            kind,
            op,
            button_index,
        });
        Ok(())
    }

    /// Primary (or squeeze) action started
    pub fn begin_action(&mut self, device: DeviceId, kind: ActionKind) -> Result<(), InputError> {
        self.queue(device, kind, ActionOp::Begin, NO_BUTTON)
    }

    /// Action ended normally; completes in the same tick
    pub fn end_action(&mut self, device: DeviceId, kind: ActionKind) -> Result<(), InputError> {
        self.queue(device, kind, ActionOp::End, NO_BUTTON)
    }

    /// Action aborted; ends without completing
    pub fn cancel_action(&mut self, device: DeviceId, kind: ActionKind) -> Result<(), InputError> {
        self.queue(device, kind, ActionOp::Cancel, NO_BUTTON)
    }

    /// Action with no distinguishable start and end (voice command, tap)
    pub fn instant_action(&mut self, device: DeviceId, kind: ActionKind) -> Result<(), InputError> {
        self.queue(device, kind, ActionOp::Instant, NO_BUTTON)
    }

    /// Queue an action tied to a specific gamepad button
    pub fn button_action(
        &mut self,
        device: DeviceId,
        kind: ActionKind,
        op: ActionOp,
        button_index: usize,
    ) -> Result<(), InputError> {
        let button_index = i32::try_from(button_index).map_err(|_| InputError::SlotOutOfRange {
            device,
            kind: "button",
            index: button_index,
        })?;
        self.queue(device, kind, op, button_index)
    }

    /// End a selection whose completion arrives later via [`complete_selection`](Self::complete_selection)
    pub(crate) fn end_action_deferred(&mut self, device: DeviceId) -> Result<(), InputError> {
        self.queue(device, ActionKind::Select, ActionOp::EndDeferred, NO_BUTTON)
    }

    /// Deliver a deferred selection completion, even if the source is gone
    pub fn complete_selection(&mut self, source: InputSourceId) -> Result<(), InputError> {
        let known = self.actions.contains_key(&source)
            || self.retired.iter().any(|r| r.source.id() == source);
        if !known {
            return Err(InputError::UnknownSource(source));
        }
        self.pending_actions.push(PendingAction {
            source,
            kind: ActionKind::Select,
            op: ActionOp::Complete,
            button_index: NO_BUTTON,
        });
        Ok(())
    }

    /// Forget a deferred completion that will never arrive.
    ///
    /// Covers sources already retired and sources whose deferred end is
    /// still queued for the next tick.
    pub fn discard_completion(&mut self, source: InputSourceId) {
        self.retired.retain(|r| r.source.id() != source);
        self.pending_actions.retain(|action| {
            !(action.source == source
                && action.kind == ActionKind::Select
                && action.op == ActionOp::Complete)
        });
        if let Some(machines) = self.actions.get_mut(&source) {
            machines.completion_discarded = true;
        }
    }

    // ========================================================================
    // Gamepad and poses
    // ========================================================================

    fn check_slot(&self, device: DeviceId, kind: &'static str, index: usize) -> Result<(), InputError> {
        let descriptor = self
            .registry
            .descriptor(device)
            .ok_or(InputError::UnknownDevice(device))?;
        let layout = descriptor.gamepad.ok_or(InputError::NoGamepad(device))?;
        let count = match kind {
            "button" => layout.button_count(),
            _ => layout.axis_count(),
        };
        if index >= count {
            return Err(InputError::SlotOutOfRange {
                device,
                kind,
                index,
            });
        }
        Ok(())
    }

    /// Record a button reading; visible from the next tick
    pub fn set_button(
        &mut self,
        device: DeviceId,
        index: usize,
        button: RawButton,
    ) -> Result<(), InputError> {
        self.check_slot(device, "button", index)?;
        self.pending_gamepad
            .entry(device)
            .or_default()
            .buttons
            .push((index, button));
        Ok(())
    }

    /// Record an axis reading; visible from the next tick
    pub fn set_axis(&mut self, device: DeviceId, index: usize, value: f32) -> Result<(), InputError> {
        self.check_slot(device, "axis", index)?;
        self.pending_gamepad
            .entry(device)
            .or_default()
            .axes
            .push((index, value));
        Ok(())
    }

    /// Viewer (head) pose in the tracking origin; `None` when tracking is lost
    pub fn set_viewer_pose(&mut self, transform: Option<Mat4>, emulated_position: bool) {
        let viewer = self.tracking.viewer();
        Arc::make_mut(&mut self.tracking).set_transform(viewer, transform, emulated_position);
    }

    /// Target ray pose of a device; `None` when tracking is lost.
    ///
    /// Tracked pointers are posed in the tracking origin, gaze and screen
    /// rays relative to the viewer.
    pub fn set_target_ray_pose(
        &mut self,
        device: DeviceId,
        transform: Option<Mat4>,
    ) -> Result<(), InputError> {
        let source = self
            .registry
            .get(device)
            .ok_or(InputError::UnknownDevice(device))?;
        let space = source.target_ray_space();
        let emulated = source.tracking() == TrackingLevel::ThreeDof;
        Arc::make_mut(&mut self.tracking).set_transform(space, transform, emulated);
        Ok(())
    }

    /// Grip pose of a device; `None` when tracking is lost
    pub fn set_grip_pose(
        &mut self,
        device: DeviceId,
        transform: Option<Mat4>,
    ) -> Result<(), InputError> {
        let source = self
            .registry
            .get(device)
            .ok_or(InputError::UnknownDevice(device))?;
        let space = source.grip_space().ok_or(InputError::NoGripSpace(device))?;
        let emulated = source.tracking() == TrackingLevel::ThreeDof;
        Arc::make_mut(&mut self.tracking).set_transform(space, transform, emulated);
        Ok(())
    }

    // ========================================================================
    // Frame boundary
    // ========================================================================

    /// Fold buffered gamepad readings into new snapshots and derive button actions
    fn apply_gamepad_input(&mut self, frame_index: u64) {
        let derive = self.config.input.derive_actions_from_gamepad;
        for (device, input) in std::mem::take(&mut self.pending_gamepad) {
            let Some(source) = self.registry.get(device).cloned() else {
                continue;
            };
            let Some(previous) = source.gamepad() else {
                continue;
            };
            let mut gamepad = previous.clone();
            for (index, button) in input.buttons {
                gamepad.apply_button(index, button, &self.config.input);
            }
            for (index, value) in input.axes {
                gamepad.apply_axis(index, value, &self.config.input);
            }
            gamepad.set_timestamp(frame_index);

            if derive {
                for (slot, kind) in [
                    (BUTTON_TRIGGER, ActionKind::Select),
                    (BUTTON_SQUEEZE, ActionKind::Squeeze),
                ] {
                    let was = previous.button(slot).is_some_and(|b| b.pressed);
                    let is = gamepad.button(slot).is_some_and(|b| b.pressed);
                    let op = match (was, is) {
                        (false, true) => ActionOp::Begin,
                        (true, false) => ActionOp::End,
                        _ => continue,
                    };
                    self.pending_actions.push(PendingAction {
                        source: source.id(),
                        kind,
                        op,
                        button_index: slot as i32,
                    });
                }
            }

            if let Err(e) = self.registry.update_gamepad(device, gamepad) {
                warn!("Dropping gamepad update: {}", e);
            }
        }
    }

    fn push_events(
        events: &mut Vec<XrEvent>,
        phases: Phases,
        action: &PendingAction,
        source: &Arc<InputSource>,
        frame: &XrFrame,
    ) {
        for phase in phases {
            events.push(XrEvent::InputSource(InputSourceEvent {
                kind: InputEventKind::new(action.kind, phase),
                source: source.clone(),
                frame: frame.clone(),
                button_index: action.button_index,
            }));
        }
    }

    fn take_actions(pending: &mut Vec<PendingAction>, source: InputSourceId) -> Vec<PendingAction> {
        let (mine, rest) = std::mem::take(pending)
            .into_iter()
            .partition(|action| action.source == source);
        *pending = rest;
        mine
    }

    fn dispatch_live(
        &mut self,
        source: &Arc<InputSource>,
        pending: &mut Vec<PendingAction>,
        frame: &XrFrame,
        events: &mut Vec<XrEvent>,
    ) {
        let Some(machines) = self.actions.get_mut(&source.id()) else {
            return;
        };
        for action in Self::take_actions(pending, source.id()) {
            if action.op == ActionOp::Begin && !machines.machine(action.kind).is_active() {
                *machines.started_by(action.kind) = action.button_index;
            }
            let machine = machines.machine(action.kind);
            let phases = match action.op {
                ActionOp::Begin => machine.begin(),
                ActionOp::End => machine.end(),
                ActionOp::EndDeferred => machine.end_deferred(),
                ActionOp::Complete => machine.complete(),
                ActionOp::Cancel => machine.cancel(),
                ActionOp::Instant => machine.instantaneous(),
            };
            Self::push_events(events, phases, &action, source, frame);
        }
    }

    fn dispatch_retired(
        &mut self,
        index: usize,
        pending: &mut Vec<PendingAction>,
        frame: &XrFrame,
        events: &mut Vec<XrEvent>,
    ) {
        let retired = &mut self.retired[index];
        for action in Self::take_actions(pending, retired.source.id()) {
            if action.kind != ActionKind::Select || action.op != ActionOp::Complete {
                debug!(
                    "Ignoring {:?} for removed input source {}",
                    action.op,
                    retired.source.id()
                );
                continue;
            }
            let phases = retired.select.complete();
            Self::push_events(events, phases, &action, &retired.source, frame);
        }
    }

    /// Force every active action of a departing source to end
    fn retire(&mut self, source: &Arc<InputSource>, frame: &XrFrame, events: &mut Vec<XrEvent>) {
        let Some(mut machines) = self.actions.remove(&source.id()) else {
            return;
        };
        if machines.completion_discarded && machines.select.completion_pending() {
            // Already ended; drops the completion without further events
            machines.select.cancel();
        }
        for kind in [ActionKind::Select, ActionKind::Squeeze] {
            let button_index = *machines.started_by(kind);
            let machine = machines.machine(kind);
            if kind == ActionKind::Select && machine.completion_pending() {
                continue;
            }
            let forced = PendingAction {
                source: source.id(),
                kind,
                op: ActionOp::Cancel,
                button_index,
            };
            let phases = machine.cancel();
            if !phases.is_empty() {
                info!("Input source {} removed during {:?}", source.id(), kind);
            }
            Self::push_events(events, phases, &forced, source, frame);
        }
        if machines.select.completion_pending() {
            self.retired.push(RetiredSource {
                source: source.clone(),
                select: machines.select,
            });
        }
    }

    /// Publish a frame and return its events in dispatch order
    pub fn tick(&mut self) -> Vec<XrEvent> {
        let frame_index = self.frame.index() + 1;
        self.apply_gamepad_input(frame_index);

        let frame = XrFrame::new(
            frame_index,
            self.tracking.clone(),
            false,
            self.config.tracking.ipd,
        );
        self.frame = frame.clone();

        // Latest snapshot of every source touched this frame
        let snapshots: HashMap<InputSourceId, Arc<InputSource>> = self
            .registry
            .live()
            .chain(self.registry.departed())
            .map(|source| (source.id(), source.clone()))
            .collect();
        let latest = |source: &Arc<InputSource>| -> Arc<InputSource> {
            snapshots.get(&source.id()).cloned().unwrap_or_else(|| source.clone())
        };
        let live: HashSet<InputSourceId> = self.registry.live().map(|s| s.id()).collect();
        let previous: Vec<Arc<InputSource>> = self.registry.list().iter().map(&latest).collect();
        let introduced: Vec<Arc<InputSource>> =
            self.registry.introduced().iter().map(&latest).collect();
        let departed: Vec<InputSourceId> = self.registry.departed().iter().map(|s| s.id()).collect();

        let mut pending = std::mem::take(&mut self.pending_actions);
        let mut events = Vec::new();

        for index in 0..self.retired.len() {
            self.dispatch_retired(index, &mut pending, &frame, &mut events);
        }

        for source in &previous {
            self.dispatch_live(source, &mut pending, &frame, &mut events);
            if !live.contains(&source.id()) {
                self.retire(source, &frame, &mut events);
            }
        }

        if let Some(change) = self.registry.commit() {
            events.push(XrEvent::InputSourcesChange(change));
        }

        for source in &introduced {
            self.dispatch_live(source, &mut pending, &frame, &mut events);
            if !live.contains(&source.id()) {
                self.retire(source, &frame, &mut events);
            }
        }

        for action in pending {
            debug!(
                "Dropping {:?} {:?} for unknown input source {}",
                action.kind, action.op, action.source
            );
        }

        self.retired.retain(|r| r.select.completion_pending());

        // Spaces of departed sources stay resolvable in this frame only
        if !departed.is_empty() {
            let tracking = Arc::make_mut(&mut self.tracking);
            for id in departed {
                tracking.remove_owned_by(id);
            }
        }

        events
    }
}
