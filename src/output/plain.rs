//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::discovery::SweepReport;
use crate::scanner::{PortStatus, ScanReport};
use console::{style, Style};
use std::io::{self, Write};

/// Longest service text shown in the port table.
const SERVICE_WIDTH: usize = 60;

/// Print a scan report in human-readable plain text format.
pub fn print_plain(report: &ScanReport, quiet: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !quiet {
        writeln!(out)?;
        writeln!(
            out,
            "  {} {} ({})",
            style("Target:").bold(),
            report.target,
            report.resolved_ip
        )?;
        writeln!(out, "  {} {}", style("Mode:").bold(), report.scan_type)?;
        writeln!(out)?;

        writeln!(
            out,
            "  {:>6}  {:^10}  {}",
            style("PORT").bold(),
            style("STATUS").bold(),
            style("SERVICE").bold()
        )?;
        writeln!(
            out,
            "  {}",
            style("──────────────────────────────────────────────").dim()
        )?;

        for outcome in &report.results {
            writeln!(
                out,
                "  {:>6}  {:^10}  {}",
                outcome.port,
                status_style(outcome.status).apply_to(outcome.status.to_string()),
                truncate(&outcome.service, SERVICE_WIDTH)
            )?;
        }
        writeln!(out)?;
    }

    let errors = if report.error_count > 0 {
        format!(", {} errors", style(report.error_count).magenta())
    } else {
        String::new()
    };
    writeln!(
        out,
        "{} {} ports in {} ms: {} open, {} closed, {} filtered{}",
        style("Scanned").bold(),
        report.total_scanned,
        report.duration_ms,
        style(report.open_count).green().bold(),
        style(report.closed_count).red(),
        style(report.filtered_count).yellow(),
        errors
    )?;

    Ok(())
}

/// Print a sweep report as a host list plus a summary line.
pub fn print_sweep(report: &SweepReport, quiet: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !quiet {
        for host in &report.alive_hosts {
            writeln!(out, "  {}", style(host).green())?;
        }
    }

    writeln!(
        out,
        "{} {} alive in {}",
        style("Hosts:").bold(),
        style(report.count).green().bold(),
        report.subnet
    )?;

    Ok(())
}

/// Print the pre-scan header: version, usage notice, and scan shape.
pub fn print_scan_header(target: &str, mode: &str, ports: usize) {
    println!();
    println!(
        "{} v{}",
        style("PortAtlas").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{}",
        style("Scan only hosts you own or are authorized to test.").dim()
    );
    println!(
        "{} {} ({} ports, {} mode)",
        style("Scanning").cyan(),
        style(target).bold(),
        ports,
        mode
    );
    println!();
}

fn status_style(status: PortStatus) -> Style {
    match status {
        PortStatus::Open => Style::new().green().bold(),
        PortStatus::Closed => Style::new().red(),
        PortStatus::Filtered => Style::new().yellow(),
        PortStatus::Error => Style::new().magenta(),
    }
}

/// Truncate display text, appending an ellipsis when cut.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
