//! Scenario report types and serialization

use serde::{Deserialize, Serialize};

/// Scenario execution report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Report format version
    #[serde(default = "default_version")]
    pub version: String,
    /// Script file name (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Scenario name from the script
    pub name: String,
    /// Frames executed
    pub frames_executed: u64,
    /// Total frames in script
    pub total_frames: u64,
    /// Every dispatched event, in order
    pub events: Vec<EventRecord>,
    /// Expectation results
    pub expectations: Vec<ExpectationResult>,
    /// Summary statistics
    pub summary: ReportSummary,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// One dispatched event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Frame the event was dispatched in
    pub frame: u64,
    /// Event type (e.g. "selectstart")
    pub event: String,
    /// Script name of the source's device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Gamepad button that caused the event, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_index: Option<i32>,
    /// Devices added (`inputsourceschange` only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    /// Devices removed (`inputsourceschange` only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

impl EventRecord {
    /// `event:device` form used by expectations
    pub fn label(&self) -> String {
        match &self.device {
            Some(device) => format!("{}:{}", self.event, device),
            None => self.event.clone(),
        }
    }

    /// Whether an expectation entry describes this event
    pub fn matches(&self, expected: &str) -> bool {
        if expected.contains(':') {
            expected == self.label()
        } else {
            expected == self.event
        }
    }
}

/// Outcome of one frame's `expect` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationResult {
    pub frame: u64,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub passed: bool,
}

/// Report summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of dispatched events
    pub events: usize,
    /// Number of passed expectations
    pub expectations_passed: usize,
    /// Number of failed expectations
    pub expectations_failed: usize,
    /// Overall status
    pub status: String,
}

impl ScenarioReport {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Whether every expectation held
    pub fn passed(&self) -> bool {
        self.summary.expectations_failed == 0
    }

    /// Failed expectations
    pub fn failures(&self) -> impl Iterator<Item = &ExpectationResult> {
        self.expectations.iter().filter(|e| !e.passed)
    }
}
