//! Scan subcommand implementation.
//!
//! Handles the `portatlas scan <target>` command for port scanning.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::time::Duration;

use crate::cli::OutputFormat;
use crate::output;
use crate::scanner::{run_scan, ScanMode, ScanRequest, DEFAULT_CONCURRENCY};
use crate::types::PortSpec;
use crate::DEFAULT_PORTS;

/// Scan a target for open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Target to scan (IP address or hostname)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports to scan (e.g., "80", "22,80", "1-1024", or "all")
    #[arg(short, long, default_value = DEFAULT_PORTS)]
    pub ports: String,

    /// Scan the full 1-65535 range, overriding --ports
    #[arg(long = "all-ports")]
    pub all_ports: bool,

    /// Scan mode
    #[arg(short = 's', long = "scan-type", value_enum, default_value_t = ScanMode::TcpConnect)]
    pub mode: ScanMode,

    /// Identify services on open ports
    #[arg(short = 'b', long)]
    pub banner: bool,

    /// Per-probe connect/read timeout in milliseconds
    #[arg(short = 't', long, default_value = "3000")]
    pub timeout: u64,

    /// Maximum number of probes in flight
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, format: OutputFormat, quiet: bool) -> Result<()> {
        let spec = if self.all_ports {
            PortSpec::full()
        } else {
            self.ports
                .parse::<PortSpec>()
                .with_context(|| format!("invalid port specification '{}'", self.ports))?
        };

        let ports = spec.to_ports();
        if ports.is_empty() {
            bail!("no valid ports specified");
        }

        if format == OutputFormat::Plain && !quiet {
            output::print_scan_header(&self.target, &self.mode.to_string(), ports.len());
        }

        let request = ScanRequest::new(&self.target, ports)
            .with_mode(self.mode)
            .with_banner(self.banner)
            .with_timeout(Duration::from_millis(self.timeout))
            .with_concurrency(self.concurrency);

        let report = run_scan(&request).await?;
        output::print_report(&report, format, quiet)?;

        Ok(())
    }
}
