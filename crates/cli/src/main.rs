//! Headless battle runner.
//!
//! Loads an encounter from content, drives the clock in real time and logs
//! the fight through `tracing`. Set `RUST_LOG=battle=debug` to see scheduler
//! decisions.

mod commands;
mod narrator;

use anyhow::Result;
use clap::Parser;
use commands::{List, Run};

/// Active-time battle runner
#[derive(Parser)]
#[command(name = "battle")]
#[command(about = "Runs battle encounters headlessly", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play an encounter to the end
    Run(Run),

    /// List bundled actions and encounters
    List(List),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::List(cmd) => cmd.execute(),
    }
}
