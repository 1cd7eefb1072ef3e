use nessus_queue_core::ScanId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scanner API returned HTTP {status}")]
    RemoteApi { status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse scan list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("scan {scan_id} was not listed in {polls} consecutive polls")]
    Unreachable { scan_id: ScanId, polls: u32 },

    #[error("console interaction failed: {0}")]
    Browser(#[from] nessus_queue_browser::BrowserError),

    /// The console failed before the launch control was pressed.
    #[error("scan {scan_id} was not launched: {source}")]
    NotLaunched {
        scan_id: ScanId,
        source: nessus_queue_browser::BrowserError,
    },
}

impl ScanError {
    /// Whether this error proves the launch control was never pressed.
    #[must_use]
    pub fn launch_never_pressed(&self) -> bool {
        matches!(self, Self::NotLaunched { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
