//! Scenario execution engine
//!
//! Drives an [`XrInputSession`] frame-by-frame from a script, recording
//! every dispatched event and checking `expect` lists.

use hashbrown::HashMap;
use tracing::{debug, info, warn};

use super::ScriptError;
use super::ast::{DeviceDecl, FrameEntry, SCREEN, ScenarioScript, VIEWER};
use super::report::{EventRecord, ExpectationResult, ReportSummary, ScenarioReport};
use super::validation::validate_script;
use crate::config::Config;
use crate::error::InputError;
use crate::event::XrEvent;
use crate::screen::ScreenInputAdapter;
use crate::selection::ActionKind;
use crate::session::XrInputSession;
use crate::source::{DeviceId, InputSource, InputSourceDescriptor};

/// Scenario runner state
pub struct ScenarioRunner {
    name: String,
    devices: Vec<DeviceDecl>,
    /// Entries by frame number
    entries: HashMap<u64, FrameEntry>,
    total_frames: u64,
    session: XrInputSession,
    screen: Option<ScreenInputAdapter>,
    /// Stop at the first failed expectation
    fail_fast: bool,
}

impl ScenarioRunner {
    /// Validate a script and prepare a fresh session for it
    pub fn new(script: &ScenarioScript, config: Config) -> Result<Self, ScriptError> {
        validate_script(script)?;
        let screen = script
            .surface
            .map(|surface| ScreenInputAdapter::new(surface.width, surface.height, &config.screen));
        let total_frames = if script.frames.is_empty() {
            0
        } else {
            script.max_frame() + 1
        };
        Ok(Self {
            name: script.name.clone(),
            devices: script.devices.clone(),
            entries: script.frames.iter().map(|f| (f.f, f.clone())).collect(),
            total_frames,
            session: XrInputSession::new(config),
            screen,
            fail_fast: false,
        })
    }

    /// Stop at the first failed expectation
    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Session being driven
    pub fn session(&self) -> &XrInputSession {
        &self.session
    }

    /// Execute every frame and build the report
    pub fn run(&mut self) -> Result<ScenarioReport, ScriptError> {
        info!(
            "Running scenario '{}' ({} frames, {} devices)",
            self.name,
            self.total_frames,
            self.devices.len()
        );

        let mut events = Vec::new();
        let mut expectations = Vec::new();
        let mut frames_executed = 0;

        for frame in 0..self.total_frames {
            let expected = match self.entries.remove(&frame) {
                Some(entry) => {
                    self.apply(&entry)
                        .map_err(|error| ScriptError::Host { frame, error })?;
                    entry.expect
                }
                None => None,
            };

            let records: Vec<EventRecord> = self
                .session
                .tick()
                .iter()
                .map(|event| self.record(frame, event))
                .collect();
            frames_executed = frame + 1;

            let failed = expected.is_some_and(|expected| {
                let result = check(frame, expected, &records);
                let failed = !result.passed;
                if failed {
                    warn!(
                        "Frame {}: expected {:?}, got {:?}",
                        frame, result.expected, result.actual
                    );
                }
                expectations.push(result);
                failed
            });
            events.extend(records);

            if failed && self.fail_fast {
                info!("Stopping at frame {} (fail-fast)", frame);
                break;
            }
        }

        let passed = expectations.iter().filter(|e: &&ExpectationResult| e.passed).count();
        let failed = expectations.len() - passed;
        Ok(ScenarioReport {
            version: "1.0".to_string(),
            script: None, // Set by caller if available
            name: self.name.clone(),
            frames_executed,
            total_frames: self.total_frames,
            summary: ReportSummary {
                events: events.len(),
                expectations_passed: passed,
                expectations_failed: failed,
                status: if failed > 0 {
                    "FAILED".to_string()
                } else {
                    "PASSED".to_string()
                },
            },
            events,
            expectations,
        })
    }

    fn device_id(&self, name: &str) -> Result<DeviceId, InputError> {
        self.devices
            .iter()
            .position(|d| d.name == name)
            .map(|index| DeviceId(index as u32 + 1))
            .ok_or(InputError::UnknownDevice(DeviceId(0)))
    }

    fn descriptor(&self, name: &str) -> Result<(DeviceId, InputSourceDescriptor), InputError> {
        let id = self.device_id(name)?;
        let decl = &self.devices[(id.0 - 1) as usize];
        Ok((id, decl.descriptor.clone()))
    }

    fn device_name(&self, source: &InputSource) -> String {
        if source.is_transient() {
            return SCREEN.to_string();
        }
        let index = source.device().0 as usize;
        match index.checked_sub(1).and_then(|i| self.devices.get(i)) {
            Some(decl) => decl.name.clone(),
            None => source.device().to_string(),
        }
    }

    /// Apply one frame's host input, in a fixed order
    fn apply(&mut self, entry: &FrameEntry) -> Result<(), InputError> {
        for name in &entry.connect {
            let (id, descriptor) = self.descriptor(name)?;
            self.session.connect(id, descriptor)?;
        }
        for update in &entry.update {
            let id = self.device_id(&update.device)?;
            self.session.update(id, update.descriptor.clone())?;
        }
        for name in &entry.disconnect {
            self.session.disconnect(self.device_id(name)?)?;
        }

        for pose in &entry.pose {
            let transform = pose.transform();
            if pose.device == VIEWER {
                self.session.set_viewer_pose(Some(transform), false);
                continue;
            }
            let id = self.device_id(&pose.device)?;
            if pose.grip {
                self.session.set_grip_pose(id, Some(transform))?;
            } else {
                self.session.set_target_ray_pose(id, Some(transform))?;
            }
        }
        for name in &entry.lose_tracking {
            if name == VIEWER {
                self.session.set_viewer_pose(None, false);
                continue;
            }
            let id = self.device_id(name)?;
            self.session.set_target_ray_pose(id, None)?;
            let has_grip = self
                .session
                .source(id)
                .is_some_and(|source| source.grip_space().is_some());
            if has_grip {
                self.session.set_grip_pose(id, None)?;
            }
        }

        for button in &entry.buttons {
            let id = self.device_id(&button.device)?;
            self.session.set_button(id, button.index, button.raw())?;
        }
        for axis in &entry.axes {
            let id = self.device_id(&axis.device)?;
            self.session.set_axis(id, axis.index, axis.value)?;
        }

        let actions = [
            (&entry.press, ActionKind::Select, Action::Begin),
            (&entry.release, ActionKind::Select, Action::End),
            (&entry.cancel, ActionKind::Select, Action::Cancel),
            (&entry.instant, ActionKind::Select, Action::Instant),
            (&entry.squeeze, ActionKind::Squeeze, Action::Begin),
            (&entry.squeeze_release, ActionKind::Squeeze, Action::End),
        ];
        for (names, kind, action) in actions {
            for name in names {
                let id = self.device_id(name)?;
                match action {
                    Action::Begin => self.session.begin_action(id, kind)?,
                    Action::End => self.session.end_action(id, kind)?,
                    Action::Cancel => self.session.cancel_action(id, kind)?,
                    Action::Instant => self.session.instant_action(id, kind)?,
                }
            }
        }

        if let Some(screen) = self.screen.as_mut() {
            for event in &entry.pointer {
                screen.handle(&mut self.session, event)?;
            }
        } else if !entry.pointer.is_empty() {
            debug!("Frame {}: no surface for pointer events", entry.f);
        }
        Ok(())
    }

    fn record(&self, frame: u64, event: &XrEvent) -> EventRecord {
        match event {
            XrEvent::InputSourcesChange(change) => EventRecord {
                frame,
                event: event.name().to_string(),
                device: None,
                button_index: None,
                added: change.added.iter().map(|s| self.device_name(s)).collect(),
                removed: change.removed.iter().map(|s| self.device_name(s)).collect(),
            },
            XrEvent::InputSource(source_event) => EventRecord {
                frame,
                event: event.name().to_string(),
                device: Some(self.device_name(&source_event.source)),
                button_index: (source_event.button_index >= 0).then_some(source_event.button_index),
                added: Vec::new(),
                removed: Vec::new(),
            },
        }
    }
}

/// Host action edge from a script list
#[derive(Debug, Clone, Copy)]
enum Action {
    Begin,
    End,
    Cancel,
    Instant,
}

fn check(frame: u64, expected: Vec<String>, records: &[EventRecord]) -> ExpectationResult {
    let passed = expected.len() == records.len()
        && expected
            .iter()
            .zip(records)
            .all(|(expected, record)| record.matches(expected));
    ExpectationResult {
        frame,
        expected,
        actual: records.iter().map(EventRecord::label).collect(),
        passed,
    }
}
