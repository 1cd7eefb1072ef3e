//! nessus-queue core - foundation crate for the scan queue.
//!
//! This crate provides shared types, error handling and configuration
//! management that the browser, scanner and app crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML tunables with XDG paths, credentials from the environment
//! - [`types`] - `ScanId`, `ScanRecord`, `ScanPhase` and operator input parsing
//!
//! # Example
//!
//! ```rust
//! use nessus_queue_core::{parse_scan_ids, AppConfig, ScanId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.monitor.poll_interval_secs, 5);
//!
//! let ids = parse_scan_ids("12, 14")?;
//! assert_eq!(ids, vec![ScanId::new(12), ScanId::new(14)]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    ApiConfig, AppConfig, BrowserConfig, ConsoleConfig, Credentials, MonitorConfig,
};
pub use error::{ConfigError, ConfigResult, NessusError, Result};
pub use types::{parse_scan_ids, ScanId, ScanPhase, ScanRecord, STATUS_COMPLETED, STATUS_EMPTY};
