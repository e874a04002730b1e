// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockscout")]
#[command(about = "Inventory of deployed container images with registry update detection")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the essential result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print the resulting inventory as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to config file (default: discover in current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the inventory from compose manifests and the container runtime
    Refresh,

    /// Check the least recently checked images against their registries
    Check {
        /// Maximum number of images to check (default: configured batch size)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Check specific inventory records by id
    CheckId {
        /// Record ids as shown by `status --json`
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Check every image of one compose stack
    CheckStack {
        /// Stack name (the manifest's directory name)
        stack: String,
    },

    /// Show the stored inventory
    Status,

    /// Keep refreshing and checking on the configured intervals
    Watch,
}
