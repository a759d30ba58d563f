//! Print the effective configuration

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use xrinput_core::config;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the effective config back (fills in defaults)
    #[arg(long)]
    pub save: bool,
}

/// Print the effective configuration as TOML
pub fn execute(args: ConfigArgs) -> Result<()> {
    let path = match args.config {
        Some(path) => path,
        None => config::config_dir()
            .context("Could not determine config directory")?
            .join("config.toml"),
    };
    let effective = config::load_from(&path);

    println!("# {}", path.display());
    print!(
        "{}",
        toml::to_string_pretty(&effective).context("Failed to serialize config")?
    );

    if args.save {
        config::save_to(&effective, &path)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        println!();
        println!("Config written to: {}", path.display());
    }
    Ok(())
}
