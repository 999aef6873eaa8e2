mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{draft, init, replay, DraftArgs, InitArgs, ReplayArgs};
use tracing_subscriber::EnvFilter;

/// Furrow CLI - autosave drafts and editable grids for farm planning
#[derive(Parser, Debug)]
#[command(name = "furrow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default furrow.config.json
    Init(InitArgs),

    /// Replay grid events against an in-memory store
    Replay(ReplayArgs),

    /// Replay draft edits and saves against an in-memory store
    Draft(DraftArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(cwd) => match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Replay(args) => replay(args, &cwd).await,
            Command::Draft(args) => draft(args, &cwd).await,
        },
        Err(err) => Err(anyhow::Error::new(err).context("Cannot get current directory")),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
