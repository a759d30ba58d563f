//! Validate a scenario script without running

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use xrinput_core::ScenarioScript;
use xrinput_core::script::validate_script;

/// Arguments for the validate command
#[derive(Args)]
pub struct ValidateArgs {
    /// Scenario script (.toml)
    pub script: PathBuf,
}

/// Validate a scenario script
pub fn execute(args: ValidateArgs) -> Result<()> {
    println!("Validating script: {}", args.script.display());

    let script = ScenarioScript::from_file(&args.script)
        .with_context(|| format!("Failed to parse script: {}", args.script.display()))?;
    validate_script(&script)
        .with_context(|| format!("Invalid script: {}", args.script.display()))?;

    println!();
    println!("=== Script Valid ===");
    if !script.name.is_empty() {
        println!("Name: {}", script.name);
    }
    println!("Devices: {}", script.devices.len());
    for device in &script.devices {
        println!(
            "  {} ({}, {})",
            device.name,
            device.descriptor.target_ray_mode.as_str(),
            device.descriptor.handedness.as_str()
        );
    }
    println!("Frames: {}", script.frames.len());
    println!("Max frame: {}", script.max_frame());
    println!("Expectations: {}", script.expect_frames().count());

    Ok(())
}
