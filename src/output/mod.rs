//! Report rendering.
//!
//! Dispatches scan and sweep reports to the plain, JSON, or CSV renderers.

mod csv_format;
mod json_format;
mod plain;

pub use plain::print_scan_header;

use crate::cli::OutputFormat;
use crate::discovery::SweepReport;
use crate::scanner::ScanReport;
use std::io;

/// Render a scan report in the requested format.
pub fn print_report(report: &ScanReport, format: OutputFormat, quiet: bool) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(report, quiet),
        OutputFormat::Json => json_format::print_json(report),
        OutputFormat::Csv => csv_format::print_csv(report),
    }
}

/// Render a sweep report in the requested format.
pub fn print_sweep(report: &SweepReport, format: OutputFormat, quiet: bool) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_sweep(report, quiet),
        OutputFormat::Json => json_format::print_json(report),
        OutputFormat::Csv => csv_format::print_sweep_csv(report),
    }
}
