//! Execute a scenario script and generate a report

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use xrinput_core::config::{self, Config};
use xrinput_core::{ScenarioReport, ScenarioRunner, ScenarioScript};

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Scenario script (.toml)
    pub script: PathBuf,

    /// Output report file (JSON)
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Stop on first failed expectation
    #[arg(long)]
    pub fail_fast: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Load, validate and execute a scenario
pub fn run_script(script: &Path, config: Config, fail_fast: bool) -> Result<ScenarioReport> {
    let parsed = ScenarioScript::from_file(script)
        .with_context(|| format!("Failed to parse script: {}", script.display()))?;
    let mut runner = ScenarioRunner::new(&parsed, config)
        .with_context(|| format!("Invalid script: {}", script.display()))?
        .fail_fast(fail_fast);
    let mut report = runner
        .run()
        .with_context(|| format!("Failed to execute script: {}", script.display()))?;
    report.script = Some(script.display().to_string());
    Ok(report)
}

/// Execute a scenario script
pub fn execute(args: RunArgs) -> Result<()> {
    println!("Executing script: {}", args.script.display());
    println!("  Fail-fast: {}", args.fail_fast);

    let config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    let report = run_script(&args.script, config, args.fail_fast)?;

    println!();
    println!("=== {} ===", report.name);
    println!(
        "Frames: {}/{}",
        report.frames_executed, report.total_frames
    );
    println!("Events: {}", report.summary.events);
    println!(
        "Expectations: {} passed, {} failed",
        report.summary.expectations_passed, report.summary.expectations_failed
    );

    for failure in report.failures() {
        println!();
        println!("Frame {}:", failure.frame);
        println!("  expected: {:?}", failure.expected);
        println!("  actual:   {:?}", failure.actual);
    }

    if let Some(report_path) = &args.report {
        let json = report.to_json().context("Failed to serialize report")?;
        std::fs::write(report_path, json)
            .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
        println!();
        println!("Report written to: {}", report_path.display());
    }

    if !report.passed() {
        anyhow::bail!(
            "{} expectation(s) failed",
            report.summary.expectations_failed
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        name = "voice"

        [[devices]]
        name = "voice"
        target_ray_mode = "gaze"
        tracking = "none"

        [[frames]]
        f = 0
        connect = ["voice"]

        [[frames]]
        f = 1
        instant = ["voice"]
        expect = ["selectstart", "selectend", "select"]
    "#;

    #[test]
    fn test_run_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.toml");
        std::fs::write(&path, SCRIPT).unwrap();

        let report = run_script(&path, Config::default(), false).unwrap();
        assert!(report.passed());
        assert_eq!(report.script.as_deref(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_failed_run_exits_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.toml");
        std::fs::write(&path, SCRIPT.replace("\"select\"]", "\"squeeze\"]")).unwrap();
        let report_path = dir.path().join("report.json");

        let result = execute(RunArgs {
            script: path,
            report: Some(report_path.clone()),
            fail_fast: false,
            config: Some(dir.path().join("missing.toml")),
        });
        assert!(result.is_err());
        let json = std::fs::read_to_string(report_path).unwrap();
        assert!(json.contains("\"status\": \"FAILED\""));
    }

    #[test]
    fn test_missing_script() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_script(&dir.path().join("nope.toml"), Config::default(), false).unwrap_err();
        assert!(err.to_string().contains("Failed to parse script"));
    }
}
