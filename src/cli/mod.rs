//! CLI argument parsing using clap 4.x derive macros

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Compose asynchronous agents into validated plans and run them
///
/// Ships a small demonstration pipeline wired through the configured
/// retry, timeout and fallback policies.
#[derive(Parser, Debug)]
#[command(name = "agentplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the processor -> summarizer pipeline
    Demo {
        /// Text fed to the processor node
        #[arg(short, long, default_value = "hello world")]
        input: String,

        /// Make the processor fail this many times before succeeding
        #[arg(long, default_value_t = 0)]
        flaky: u32,
    },

    /// Build a deliberately cyclic plan and report why it is rejected
    ValidateDemo,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write the default configuration to disk
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
