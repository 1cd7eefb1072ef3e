//! nessus-queue command line application.
//!
//! This is the thin shell that loads configuration, prints the scan listing,
//! reads the scans to monitor and runs them through the monitor one at a time.
//! Core logic lives in the `crates/` directory.

mod bootstrap;
mod display;

use anyhow::Context;
use bootstrap::EnvFile;
use nessus_queue_browser::BrowserEngine;
use nessus_queue_core::{AppConfig, Credentials};
use nessus_queue_scanner::{ConsoleLauncher, NessusClient, ScanDirectory, ScanMonitor};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nessus_queue=debug"));

    // stdout carries the listing and the prompt
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Run the interactive queue.
///
/// Returns a failure exit code without an error when the operator has to act
/// first (example `.env` written).
pub async fn run() -> anyhow::Result<ExitCode> {
    init_tracing();

    info!("Starting nessus-queue v{}", env!("CARGO_PKG_VERSION"));

    let env_path = Path::new(".env");
    if bootstrap::ensure_env_file(env_path)? == EnvFile::Created {
        println!("Error: The '.env' file does not exist.");
        println!(
            "An example '.env' file has been created at '{}'. Please fill in the appropriate values.",
            env_path.display()
        );
        return Ok(ExitCode::FAILURE);
    }
    bootstrap::load_env_file(env_path)?;

    let credentials = Credentials::from_env()?;
    let config = AppConfig::load_with_env().context("failed to load configuration")?;

    let directory = Arc::new(NessusClient::new(&credentials, &config.api)?);
    let launcher = Arc::new(ConsoleLauncher::new(
        BrowserEngine::with_config(config.browser.clone()),
        &credentials,
        &config.console,
        &config.browser,
    ));

    println!("Listing available scan information...");
    let scans = directory
        .list_scans()
        .await
        .context("error listing scans")?;

    let mut stdout = std::io::stdout().lock();
    display::write_listing(&mut stdout, &scans)?;
    let scan_ids = display::prompt_scan_ids(std::io::stdin().lock(), &mut stdout)?;
    stdout.flush()?;
    drop(stdout);

    let monitor = ScanMonitor::new(directory, launcher).with_config(&config.monitor);
    monitor
        .monitor_all(&scan_ids, |result| {
            println!("{}", display::completion_line(result));
        })
        .await;

    println!("All selected scans have been checked.");
    Ok(ExitCode::SUCCESS)
}
