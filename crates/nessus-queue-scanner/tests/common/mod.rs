//! Scripted collaborators for monitor tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nessus_queue_core::{ScanId, ScanRecord};
use nessus_queue_scanner::{LaunchOutcome, Result, ScanDirectory, ScanError, ScanLauncher};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// One scripted directory response.
#[derive(Debug, Clone)]
pub enum Poll {
    /// Listing with these `(id, status)` pairs
    Scans(Vec<(u64, &'static str)>),
    /// Non-success HTTP status
    Fail(u16),
}

impl Poll {
    pub fn one(id: u64, status: &'static str) -> Self {
        Self::Scans(vec![(id, status)])
    }
}

/// Directory that replays a script; the last entry repeats forever.
pub struct ScriptedDirectory {
    script: Mutex<VecDeque<Poll>>,
    calls: AtomicU32,
}

impl ScriptedDirectory {
    pub fn new(script: impl IntoIterator<Item = Poll>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanDirectory for ScriptedDirectory {
    async fn list_scans(&self) -> Result<Vec<ScanRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let poll = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };

        match poll.unwrap_or(Poll::Scans(Vec::new())) {
            Poll::Scans(entries) => Ok(entries
                .into_iter()
                .map(|(id, status)| ScanRecord {
                    id: ScanId::new(id),
                    name: format!("scan-{id}"),
                    status: status.to_string(),
                })
                .collect()),
            Poll::Fail(status) => Err(ScanError::RemoteApi { status }),
        }
    }
}

/// How the recording launcher answers.
#[derive(Debug, Clone, Copy)]
pub enum LaunchBehavior {
    Confirm,
    Unconfirmed,
    UiError,
    /// Browser failed to start, nothing was clicked
    NotPressed,
}

/// Launcher that records which scans it was asked to launch.
pub struct RecordingLauncher {
    behavior: LaunchBehavior,
    launched: Mutex<Vec<ScanId>>,
}

impl RecordingLauncher {
    pub fn new(behavior: LaunchBehavior) -> Self {
        Self {
            behavior,
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn launched(&self) -> Vec<ScanId> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScanLauncher for RecordingLauncher {
    async fn launch(&self, scan_id: ScanId) -> Result<LaunchOutcome> {
        self.launched.lock().unwrap().push(scan_id);

        match self.behavior {
            LaunchBehavior::Confirm => Ok(LaunchOutcome::Launched),
            LaunchBehavior::Unconfirmed => Ok(LaunchOutcome::Unconfirmed {
                status_text: "Pending".to_string(),
            }),
            LaunchBehavior::UiError => Err(ScanError::Browser(
                nessus_queue_browser::BrowserError::SelectorNotFound {
                    locator: "css `#launch`".to_string(),
                    waited: std::time::Duration::from_secs(30),
                },
            )),
            LaunchBehavior::NotPressed => Err(ScanError::NotLaunched {
                scan_id,
                source: nessus_queue_browser::BrowserError::ChromiumError(
                    "failed to launch chrome".to_string(),
                ),
            }),
        }
    }
}
