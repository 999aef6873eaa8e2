use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use furrow_grid::InvalidCommitPolicy;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Debounce delay for autosave, in milliseconds
    #[arg(short, long, default_value_t = 800)]
    pub debounce_ms: u64,

    /// Return invalid rows to view mode instead of keeping them editable
    #[arg(long)]
    pub exit_invalid_rows: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = Config::path(cwd);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let mut config = Config::default();
    config.autosave.debounce_ms = args.debounce_ms;
    if args.exit_invalid_rows {
        config.grid.invalid_commit = InvalidCommitPolicy::ExitToView;
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Adjust messages and columns in {}", DEFAULT_CONFIG_NAME);
    println!("  2. Run: furrow replay <script.json>");

    Ok(())
}
