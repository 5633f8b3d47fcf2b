//! CSV output formatting.

use crate::discovery::SweepReport;
use crate::scanner::ScanReport;
use std::io;

/// Print port outcomes as CSV rows.
pub fn print_csv(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    wtr.write_record(["port", "status", "service"])?;

    for outcome in &report.results {
        wtr.write_record([
            outcome.port.to_string().as_str(),
            outcome.status.to_string().as_str(),
            outcome.service.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print live hosts as CSV rows.
pub fn print_sweep_csv(report: &SweepReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    wtr.write_record(["host"])?;

    for host in &report.alive_hosts {
        wtr.write_record([host.to_string().as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
