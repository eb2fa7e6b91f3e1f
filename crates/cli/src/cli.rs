//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Unity Bridge - simulator state to NED frame converter and publisher
#[derive(Parser, Debug)]
#[command(
    name = "unity-bridge",
    author,
    version,
    about = "Unity vehicle state to NED frame bridge",
    long_about = "Receives vehicle state samples from the Unity simulator, converts them \n\
                  from the simulator's left-handed Y-up frame into the NED convention \n\
                  and publishes the full channel set to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "UNITY_BRIDGE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "UNITY_BRIDGE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bridge
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "UNITY_BRIDGE_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the state source kind from configuration
    #[arg(long, value_enum, env = "UNITY_BRIDGE_SOURCE")]
    pub source: Option<SourceArg>,

    /// Override the UDP bind address from configuration
    #[arg(long, env = "UNITY_BRIDGE_BIND")]
    pub bind: Option<SocketAddr>,

    /// Stop after this many publications (0 = unlimited)
    #[arg(long, default_value = "0", env = "UNITY_BRIDGE_MAX_SAMPLES")]
    pub max_samples: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "UNITY_BRIDGE_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9100", env = "UNITY_BRIDGE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show every output channel name
    #[arg(long)]
    pub topics: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// State source selectable from the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceArg {
    /// Synthetic trajectory, no simulator needed
    Mock,
    /// Samples pushed by the simulator over UDP
    Udp,
}

impl From<SourceArg> for contracts::SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Mock => contracts::SourceKind::Mock,
            SourceArg::Udp => contracts::SourceKind::Udp,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
