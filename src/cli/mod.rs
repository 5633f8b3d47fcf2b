//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `portatlas scan <target>` - Scan a target's ports
//! - `portatlas sweep <subnet>` - Ping-sweep a subnet for live hosts
//! - `portatlas serve` - Run the HTTP API

mod scan;
mod serve;
mod sweep;

pub use scan::ScanCommand;
pub use serve::ServeCommand;
pub use sweep::SweepCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// PortAtlas - an async TCP/UDP port scanner.
///
/// Probes target ports concurrently, classifies each as open, closed, or
/// filtered, and optionally identifies listening services via lightweight
/// protocol handshakes.
#[derive(Parser, Debug)]
#[command(name = "portatlas")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Async port scanner with service detection", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print the summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for results
    #[arg(short, long, global = true, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target for open ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Ping-sweep a subnet for live hosts
    #[command(alias = "w")]
    Sweep(SweepCommand),

    /// Run the HTTP scan API
    Serve(ServeCommand),
}

impl Cli {
    /// Dispatch to the selected subcommand.
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Scan(cmd) => cmd.execute(self.output, self.quiet).await,
            Commands::Sweep(cmd) => cmd.execute(self.output, self.quiet).await,
            Commands::Serve(cmd) => cmd.execute().await,
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
