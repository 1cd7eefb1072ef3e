//! Operator-facing console output and input.

use anyhow::Context;
use nessus_queue_core::{parse_scan_ids, ScanId, ScanRecord};
use nessus_queue_scanner::MonitorResult;
use std::io::{BufRead, Write};

/// Print one line per scan.
pub fn write_listing<W: Write>(out: &mut W, scans: &[ScanRecord]) -> std::io::Result<()> {
    for scan in scans {
        writeln!(
            out,
            "ID: {}, Name: {}, Status: {}",
            scan.id, scan.name, scan.status
        )?;
    }
    Ok(())
}

/// Ask for the comma-separated list of scans to monitor.
pub fn prompt_scan_ids<R: BufRead, W: Write>(
    mut input: R,
    out: &mut W,
) -> anyhow::Result<Vec<ScanId>> {
    write!(out, "Enter the IDs of scans to monitor (comma-separated): ")?;
    out.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read scan IDs")?;

    Ok(parse_scan_ids(&line)?)
}

/// Line printed when a scan leaves the queue.
#[must_use]
pub fn completion_line(result: &MonitorResult) -> String {
    match &result.outcome {
        Ok(report) if report.completed => format!(
            "Scan with ID {} is completed. Moving to next scan...",
            result.scan_id
        ),
        _ => format!("Scan with ID {} could not be monitored.", result.scan_id),
    }
}
