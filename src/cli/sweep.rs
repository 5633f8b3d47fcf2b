//! Sweep subcommand implementation.
//!
//! Handles the `portatlas sweep <subnet>` command for host discovery.

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::OutputFormat;
use crate::discovery::{sweep_subnet, SWEEP_CONCURRENCY};
use crate::output;

/// Ping-sweep a subnet for live hosts.
#[derive(Parser, Debug)]
pub struct SweepCommand {
    /// Subnet in CIDR notation (e.g., "192.168.1.0/24")
    #[arg(value_name = "SUBNET")]
    pub subnet: String,

    /// Maximum number of pings in flight
    #[arg(short = 'c', long, default_value_t = SWEEP_CONCURRENCY)]
    pub concurrency: usize,
}

impl SweepCommand {
    /// Execute the sweep command.
    pub async fn execute(&self, format: OutputFormat, quiet: bool) -> Result<()> {
        let report = sweep_subnet(&self.subnet, self.concurrency)
            .await
            .with_context(|| format!("sweep of '{}' failed", self.subnet))?;

        output::print_sweep(&report, format, quiet)?;
        Ok(())
    }
}
