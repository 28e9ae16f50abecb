//! linkshelf CLI: turn a list of saved links into a markdown knowledge base.
//!
//! Reads a JSON resource list, fetches each page, and writes one markdown
//! file per resource plus a processing log that makes re-runs resumable.

mod commands;
mod progress;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
