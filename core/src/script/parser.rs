//! TOML scenario script parser
//!
//! Parses scenario files into a structured representation.

use std::path::Path;

use super::ScriptError;
use super::ast::ScenarioScript;

impl ScenarioScript {
    /// Parse a TOML scenario script from a string
    pub fn from_toml(toml_str: &str) -> Result<Self, ScriptError> {
        toml::from_str(toml_str).map_err(|e| ScriptError::Toml(e.to_string()))
    }

    /// Parse a TOML scenario script from a file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScriptError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ScriptError> {
        toml::to_string_pretty(self).map_err(|e| ScriptError::Toml(e.to_string()))
    }
}
