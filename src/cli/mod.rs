//! Command-line interface definitions.

pub mod check;
pub mod simulate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Connwatch - connection-health monitor for persistent streaming connections.
#[derive(Parser, Debug)]
#[command(name = "connwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration file and print the check schedule
    Check(ConfigPathArg),

    /// Supervise a simulated connection that goes silent
    Simulate(SimulateArgs),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "connwatch.toml")]
    pub config: PathBuf,
}

/// Arguments for the `simulate` subcommand.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "connwatch.toml")]
    pub config: PathBuf,

    /// Seconds of healthy heartbeats before the connection goes silent
    #[arg(long, default_value = "10")]
    pub silent_after: u64,

    /// Total run time in seconds
    #[arg(long, default_value = "60")]
    pub duration: u64,

    /// Number of reopens that fail before one succeeds
    #[arg(long, default_value = "0")]
    pub failed_redials: u32,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}
