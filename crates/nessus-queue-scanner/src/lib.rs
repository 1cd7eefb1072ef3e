//! nessus-queue scanner - scan lifecycle orchestration.
//!
//! This crate lists scans through the Nessus REST API, launches idle scans
//! through the web console (the API cannot), and polls each monitored scan
//! until it completes.
//!
//! # Features
//!
//! - `ScanDirectory` trait with a reqwest-backed `NessusClient`
//! - `ScanLauncher` trait with a browser-driven `ConsoleLauncher`
//! - `ScanMonitor` poll loop with launch cooldown and an optional not-found cap
//!
//! # Example
//!
//! ```rust,ignore
//! use nessus_queue_browser::BrowserEngine;
//! use nessus_queue_scanner::{ConsoleLauncher, NessusClient, ScanMonitor};
//! use std::sync::Arc;
//!
//! let directory = Arc::new(NessusClient::new(&credentials, &config.api)?);
//! let launcher = Arc::new(ConsoleLauncher::new(
//!     BrowserEngine::with_config(config.browser.clone()),
//!     &credentials,
//!     &config.console,
//!     &config.browser,
//! ));
//!
//! let monitor = ScanMonitor::new(directory, launcher).with_config(&config.monitor);
//! let completed = monitor.monitor(ScanId::new(12)).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod directory;
#[allow(missing_docs)]
pub mod error;
pub mod launcher;
pub mod monitor;

// Re-export commonly used types
pub use directory::{find_scan, parse_scan_list, NessusClient, ScanDirectory};
pub use error::{Result, ScanError};
pub use launcher::{ConsoleLauncher, LaunchOutcome, ScanLauncher};
pub use monitor::{MonitorReport, MonitorResult, ScanMonitor};
