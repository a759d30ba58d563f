//! Scenario scripts (.toml)
//!
//! Scenarios describe devices and the host input they produce frame by
//! frame, plus the events each tick is expected to dispatch. They are
//! used for regression tests and for reproducing input bugs by hand.
//!
//! # Example Script
//!
//! ```toml
//! name = "trigger click"
//!
//! [[devices]]
//! name = "right"
//! handedness = "right"
//! identity = { vendor = "oculus", product = "touch" }
//! gamepad = { capabilities = "TRIGGER | SQUEEZE | THUMBSTICK" }
//!
//! [[frames]]
//! f = 0
//! connect = ["right"]
//! expect = ["inputsourceschange"]
//!
//! [[frames]]
//! f = 1
//! press = ["right"]
//! expect = ["selectstart:right"]
//!
//! [[frames]]
//! f = 2
//! release = ["right"]
//! expect = ["selectend", "select"]
//! ```

mod ast;
mod parser;
mod report;
mod runner;
mod validation;

pub use ast::{
    AxisInput, ButtonInput, DescriptorUpdate, DeviceDecl, FrameEntry, PoseInput, SCREEN,
    ScenarioScript, Surface, VIEWER,
};
pub use report::{EventRecord, ExpectationResult, ReportSummary, ScenarioReport};
pub use runner::ScenarioRunner;
pub use validation::validate_script;

use thiserror::Error;

use crate::error::InputError;

/// Errors from loading, validating or running a scenario
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(String),

    #[error("invalid script: {0}")]
    Toml(String),

    #[error("device '{0}' is declared twice")]
    DuplicateDevice(String),

    #[error("'{0}' is a reserved device name")]
    ReservedDeviceName(String),

    #[error("duplicate frame: {0}")]
    DuplicateFrame(u64),

    #[error("frame {frame} refers to undefined device '{device}'")]
    UndefinedDevice { frame: u64, device: String },

    #[error("pointer events at frame {0} but the script has no surface")]
    PointerWithoutSurface(u64),

    #[error("frame {frame}: {error}")]
    Host {
        frame: u64,
        #[source]
        error: InputError,
    },
}
