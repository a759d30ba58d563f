//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for input settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::action_map::ActionMap;
use crate::profile::ProfilePolicy;

/// Session configuration.
///
/// Contains all user-configurable settings organized into sections.
/// Serialized to/from TOML format for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Gamepad and selection settings
    #[serde(default)]
    pub input: InputConfig,
    /// Screen (touch/mouse) adapter settings
    #[serde(default)]
    pub screen: ScreenConfig,
    /// Viewer and reference space settings
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// Named action maps
    #[serde(default)]
    pub action_maps: Vec<ActionMap>,
}

/// Input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Deadzone for touchpad and thumbstick axes (0.0-1.0)
    #[serde(default = "default_deadzone")]
    pub stick_deadzone: f32,

    /// Deadzone for analog triggers (0.0-1.0)
    #[serde(default = "default_trigger_deadzone")]
    pub trigger_deadzone: f32,

    /// Analog value at which a button counts as pressed (0.0-1.0)
    #[serde(default = "default_press_threshold")]
    pub press_threshold: f32,

    /// Raise select/squeeze events from gamepad button 0 and 2 transitions
    #[serde(default = "default_true")]
    pub derive_actions_from_gamepad: bool,

    /// Session is immersive (inline sessions never expose device identity)
    #[serde(default = "default_true")]
    pub immersive: bool,

    /// Hide device vendor and product from profiles
    #[serde(default)]
    pub mask_identity: bool,
}

/// Screen input configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Vertical field of view of the surface camera in degrees
    #[serde(default = "default_fov")]
    pub fov_y_degrees: f32,
    /// Near clipping plane (meters)
    #[serde(default = "default_near")]
    pub near: f32,
    /// Far clipping plane (meters)
    #[serde(default = "default_far")]
    pub far: f32,
}

/// Tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Interpupillary distance used to place the two eye views (meters)
    #[serde(default = "default_ipd")]
    pub ipd: f32,
    /// Height of the local origin above the floor (meters)
    #[serde(default = "default_floor_height")]
    pub floor_height: f32,
    /// Floor height is an estimate rather than a measurement
    #[serde(default = "default_true")]
    pub floor_height_emulated: bool,
}

fn default_deadzone() -> f32 {
    0.15
}
fn default_trigger_deadzone() -> f32 {
    0.1
}
fn default_press_threshold() -> f32 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_fov() -> f32 {
    60.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    1000.0
}
fn default_ipd() -> f32 {
    0.063
}
fn default_floor_height() -> f32 {
    1.6
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            stick_deadzone: default_deadzone(),
            trigger_deadzone: default_trigger_deadzone(),
            press_threshold: default_press_threshold(),
            derive_actions_from_gamepad: default_true(),
            immersive: default_true(),
            mask_identity: false,
        }
    }
}

impl InputConfig {
    /// Identity exposure rules derived from this config
    pub fn profile_policy(&self) -> ProfilePolicy {
        ProfilePolicy {
            immersive: self.immersive,
            mask_identity: self.mask_identity,
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            ipd: default_ipd(),
            floor_height: default_floor_height(),
            floor_height_emulated: default_true(),
        }
    }
}

impl Config {
    /// Action map by name
    pub fn action_map(&self, name: &str) -> Option<&ActionMap> {
        self.action_maps.iter().find(|map| map.name == name)
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Nethercore\XrInput\config`
/// On macOS: `~/Library/Application Support/io.nethercore.XrInput`
/// On Linux: `~/.config/xrinput`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "nethercore", "XrInput")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from a specific file.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_dir()
        .map(|dir| load_from(&dir.join("config.toml")))
        .unwrap_or_default()
}

/// Saves the configuration to a specific file, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the config cannot
/// be serialized, or the file cannot be written.
pub fn save_to(config: &Config, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file
/// cannot be written.
pub fn save(config: &Config) -> std::io::Result<()> {
    match config_dir() {
        Some(dir) => save_to(config, &dir.join("config.toml")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.input.stick_deadzone, 0.15);
        assert_eq!(config.input.trigger_deadzone, 0.1);
        assert!(config.input.derive_actions_from_gamepad);
        assert!(config.input.immersive);
        assert!(!config.input.mask_identity);
        assert_eq!(config.screen.near, 0.1);
        assert_eq!(config.tracking.floor_height, 1.6);
        assert!(config.action_maps.is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [input]
            mask_identity = true

            [tracking]
            ipd = 0.07
            "#,
        )
        .expect("deserialize");
        assert!(config.input.mask_identity);
        assert_eq!(config.input.press_threshold, 0.5);
        assert_eq!(config.tracking.ipd, 0.07);
        assert!(config.tracking.floor_height_emulated);
        assert_eq!(config.screen, ScreenConfig::default());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.input.stick_deadzone = 0.25;
        config.action_maps.push(ActionMap::xr_standard());
        save_to(&config, &path).expect("save");

        let loaded = load_from(&path);
        assert_eq!(loaded, config);
        assert!(loaded.action_map("xr-standard").is_some());
    }

    #[test]
    fn test_load_invalid_or_missing_returns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_from(&dir.path().join("missing.toml")), Config::default());

        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "input = 12").expect("write");
        assert_eq!(load_from(&path), Config::default());
    }

    #[test]
    fn test_profile_policy() {
        let config = InputConfig {
            immersive: false,
            ..Default::default()
        };
        let policy = config.profile_policy();
        assert!(!policy.immersive);
        assert!(!policy.mask_identity);
    }
}
