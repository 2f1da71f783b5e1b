// ABOUTME: Entry point for the dockdev CLI application.
// ABOUTME: Parses arguments, installs logging and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use dockdev::deploy::DeployOptions;
use dockdev::error::Result;
use dockdev::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli.command, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);
    match command {
        Commands::Init { name, image, force } => {
            commands::init(name.as_deref(), image.as_deref(), force, &output)
        }
        Commands::Deploy { path, proxy, local } => {
            commands::deploy(path.as_deref(), DeployOptions { proxy, local }, output).await
        }
        Commands::Status { path } => commands::status(path.as_deref(), &output),
    }
}
