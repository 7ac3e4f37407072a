//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "plank-coach",
    about = "Real-time plank form analysis and coaching engine",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ~/.plank_coach/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a recorded landmark stream through the full coaching pipeline
    Replay {
        /// JSON file holding an array of landmark frames
        input: PathBuf,

        /// Write the final report as JSON to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Score a single landmark frame file and print the analysis
    Analyze {
        /// JSON file holding one landmark frame
        input: PathBuf,
    },

    /// Create a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Inspect or reset the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Restore the configuration file to defaults
    Reset {
        /// Confirm overwriting the existing file
        #[arg(long)]
        force: bool,
    },
}
