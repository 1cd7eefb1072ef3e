//! Scan identifiers and records as reported by the scanner API.

use crate::error::{NessusError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status string for a scan with no run in progress.
pub const STATUS_EMPTY: &str = "empty";

/// Status string for a scan whose last run finished.
pub const STATUS_COMPLETED: &str = "completed";

/// Integer scan identifier assigned by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(u64);

impl ScanId {
    /// Wrap a raw scanner ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for ScanId {
    type Err = NessusError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| NessusError::Validation(format!("invalid scan ID: '{}'", s.trim())))
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scanner job as returned by `GET /scans`.
///
/// Fields the scanner sends beyond these three are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Scanner-assigned identifier
    pub id: ScanId,
    /// Display name
    pub name: String,
    /// Raw status string, e.g. `empty`, `running`, `completed`
    pub status: String,
}

impl ScanRecord {
    /// Classify the raw status into the phases the monitor branches on.
    #[must_use]
    pub fn phase(&self) -> ScanPhase {
        ScanPhase::from(self.status.as_str())
    }
}

/// The part of the status vocabulary that drives control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPhase {
    /// Idle, a launch is eligible
    Empty,
    /// Terminal success
    Completed,
    /// Anything else (running, paused, canceled, ...): keep waiting
    Other(String),
}

impl From<&str> for ScanPhase {
    fn from(status: &str) -> Self {
        match status {
            STATUS_EMPTY => Self::Empty,
            STATUS_COMPLETED => Self::Completed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Parse a comma-separated list of scan IDs typed by the operator.
///
/// Whitespace around each ID is ignored and so are empty entries, which
/// makes `"1, 2,"` valid. Order and duplicates are preserved.
///
/// # Errors
/// Returns a validation error naming the first token that is not an integer,
/// or if the input contains no IDs at all.
pub fn parse_scan_ids(input: &str) -> Result<Vec<ScanId>> {
    let ids = input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ScanId::from_str)
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(NessusError::Validation(
            "no scan IDs were entered".to_string(),
        ));
    }

    Ok(ids)
}
