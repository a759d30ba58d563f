//! xrinput CLI - Scenario runner for the XR input core
//!
//! # Commands
//!
//! - `xrinput run <script>` - Execute a scenario and check its expectations
//! - `xrinput validate <script>` - Parse and validate a scenario without running it
//! - `xrinput config` - Print the effective configuration
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario and write a JSON report
//! xrinput run scenarios/screen_tap.toml --report tap.json
//!
//! # Stop at the first failed expectation
//! xrinput run scenarios/controllers.toml --fail-fast
//! ```

mod config;
mod run;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// xrinput CLI - Scenario runner for the XR input core
#[derive(Parser)]
#[command(name = "xrinput")]
#[command(about = "Run and validate XR input scenario scripts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a scenario script and generate a report
    Run(run::RunArgs),

    /// Validate a scenario script without running
    Validate(validate::ValidateArgs),

    /// Print the effective configuration
    Config(config::ConfigArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run::execute(args),
        Commands::Validate(args) => validate::execute(args),
        Commands::Config(args) => config::execute(args),
    }
}
