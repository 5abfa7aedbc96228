//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Memo Relay - relay chat messages and text files to Memobird printers
#[derive(Parser, Debug)]
#[command(
    name = "memo-relay",
    author,
    version,
    about = "Relay chat messages and text files to Memobird thermal printers",
    long_about = "Relays matching chat messages and chunked text files to a fleet of \n\
                  Memobird printers, rotating over the registered devices.\n\n\
                  Without a subcommand an interactive menu is started."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MEMO_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MEMO_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Path to configuration file (TOML or JSON) [default: memo-relay.toml]
    #[arg(short, long, global = true, env = "MEMO_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override `memobird.access_key` from configuration
    #[arg(long, global = true, env = "MEMO_RELAY_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Prometheus metrics port (disabled when absent)
    #[arg(long, global = true, env = "MEMO_RELAY_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Relay chat messages read from a bridge event stream
    Chat(ChatArgs),

    /// Print a text file in chunks
    PrintFile(PrintFileArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `chat` command
#[derive(Parser, Debug, Clone)]
pub struct ChatArgs {
    /// JSON Lines event file written by a chat bridge (stdin when absent)
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Register an additional device (repeatable)
    #[arg(long = "device", value_name = "ID")]
    pub devices: Vec<String>,
}

/// Arguments for the `print-file` command
#[derive(Parser, Debug, Clone)]
pub struct PrintFileArgs {
    /// Text file to print
    #[arg(short, long)]
    pub file: PathBuf,

    /// Number of leading lines to skip (blank lines included)
    #[arg(long, default_value = "0")]
    pub start_line: usize,

    /// Register an additional device (repeatable)
    #[arg(long = "device", value_name = "ID")]
    pub devices: Vec<String>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show pre-registered devices
    #[arg(long)]
    pub devices: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
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
