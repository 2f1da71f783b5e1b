// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the init, deploy and status subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockdev")]
#[command(about = "Provision a DigitalOcean host and deploy your app's containers onto it")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results and errors
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a dockdev.json in the current directory
    Init {
        /// Project name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Base image for the application server
        #[arg(short, long)]
        image: Option<String>,

        /// Overwrite an existing dockdev.json
        #[arg(short, long)]
        force: bool,
    },

    /// Provision the machine, build the server image and start containers
    Deploy {
        /// Project directory (defaults to the nearest one with a dockdev.json)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Put an nginx reverse proxy in front of the server
        #[arg(long)]
        proxy: bool,

        /// Sync files into the local testing directory
        #[arg(long)]
        local: bool,
    },

    /// Show the project's recorded deployment
    Status {
        /// Project directory (defaults to the nearest one with a dockdev.json)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}
