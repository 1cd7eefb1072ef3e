//! Scan lifecycle monitor.
//!
//! This module provides the `ScanMonitor`, which polls the scan directory at a
//! fixed interval, launches a scan whenever it is observed idle, and returns
//! once the scan is observed completed.
//!
//! The directory is the only source of truth: a launch is never taken as proof
//! that the scan left the idle state, so the next poll decides.

use crate::directory::{find_scan, ScanDirectory};
use crate::error::{Result, ScanError};
use crate::launcher::{LaunchOutcome, ScanLauncher};
use chrono::{DateTime, Utc};
use nessus_queue_core::{MonitorConfig, ScanId, ScanPhase};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Summary of one monitored scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorReport {
    /// Scan that was monitored
    pub scan_id: ScanId,
    /// Whether a poll observed `completed`
    pub completed: bool,
    /// Number of directory polls made
    pub polls: u64,
    /// Number of launches attempted, whatever their outcome
    pub launch_attempts: u32,
    /// Wall-clock time of the last launch attempt
    pub last_launch_at: Option<DateTime<Utc>>,
}

impl MonitorReport {
    fn new(scan_id: ScanId) -> Self {
        Self {
            scan_id,
            completed: false,
            polls: 0,
            launch_attempts: 0,
            last_launch_at: None,
        }
    }
}

/// Result of monitoring one scan in a queue.
#[derive(Debug)]
pub struct MonitorResult {
    /// Scan that was monitored
    pub scan_id: ScanId,
    /// Report, or the error that ended monitoring
    pub outcome: Result<MonitorReport>,
}

/// Watches scans until they complete, launching them when idle.
pub struct ScanMonitor {
    directory: Arc<dyn ScanDirectory>,
    launcher: Arc<dyn ScanLauncher>,
    poll_interval: Duration,
    launch_cooldown: Duration,
    max_not_found_polls: Option<u32>,
}

/// Per-call loop state.
struct MonitorState {
    report: MonitorReport,
    not_found_streak: u32,
    last_launch: Option<Instant>,
}

impl ScanMonitor {
    /// Create a monitor with default timing.
    #[must_use]
    pub fn new(directory: Arc<dyn ScanDirectory>, launcher: Arc<dyn ScanLauncher>) -> Self {
        Self {
            directory,
            launcher,
            poll_interval: MonitorConfig::default().poll_interval(),
            launch_cooldown: MonitorConfig::default().launch_cooldown(),
            max_not_found_polls: None,
        }
    }

    /// Apply poll interval, cooldown and not-found cap from configuration.
    #[must_use]
    pub fn with_config(mut self, config: &MonitorConfig) -> Self {
        self.poll_interval = config.poll_interval();
        self.launch_cooldown = config.launch_cooldown();
        self.max_not_found_polls = config.max_not_found_polls;
        self
    }

    /// Set the minimum time between two launches of the same scan.
    #[must_use]
    pub fn with_launch_cooldown(mut self, cooldown: Duration) -> Self {
        self.launch_cooldown = cooldown;
        self
    }

    /// Give up after this many consecutive polls that do not list the scan.
    #[must_use]
    pub fn with_max_not_found_polls(mut self, max: Option<u32>) -> Self {
        self.max_not_found_polls = max;
        self
    }

    /// Monitor `scan_id` until it is observed completed.
    ///
    /// Returns `Ok(true)` once a poll sees `completed`. Without a not-found
    /// cap this never returns for a scan the directory never lists.
    pub async fn monitor(&self, scan_id: ScanId) -> Result<bool> {
        self.run(scan_id).await.map(|report| report.completed)
    }

    /// Monitor `scan_id` and return the full report.
    pub async fn run(&self, scan_id: ScanId) -> Result<MonitorReport> {
        let mut state = MonitorState {
            report: MonitorReport::new(scan_id),
            not_found_streak: 0,
            last_launch: None,
        };

        loop {
            state.report.polls += 1;
            tracing::info!(
                "Checking status of scan {} (poll {})",
                scan_id,
                state.report.polls
            );

            match self.directory.list_scans().await {
                Ok(scans) => match find_scan(&scans, scan_id) {
                    Some(scan) => {
                        state.not_found_streak = 0;
                        match scan.phase() {
                            ScanPhase::Completed => {
                                state.report.completed = true;
                                tracing::info!(
                                    "Scan {} completed after {} polls",
                                    scan_id,
                                    state.report.polls
                                );
                                return Ok(state.report);
                            }
                            ScanPhase::Empty => self.launch_if_due(&mut state).await,
                            ScanPhase::Other(status) => {
                                tracing::debug!("Scan {} is {}, rechecking", scan_id, status);
                            }
                        }
                    }
                    None => {
                        state.not_found_streak += 1;
                        tracing::warn!("Scan {} not found", scan_id);

                        if let Some(max) = self.max_not_found_polls {
                            if state.not_found_streak >= max {
                                return Err(ScanError::Unreachable {
                                    scan_id,
                                    polls: state.not_found_streak,
                                });
                            }
                        }
                    }
                },
                Err(e) => {
                    tracing::warn!("Listing scans failed, skipping this poll: {}", e);
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn launch_if_due(&self, state: &mut MonitorState) {
        let scan_id = state.report.scan_id;

        if let Some(last) = state.last_launch {
            let since = last.elapsed();
            if since < self.launch_cooldown {
                tracing::info!(
                    "Scan {} still idle {:?} after launch, waiting out the {:?} cooldown",
                    scan_id,
                    since,
                    self.launch_cooldown
                );
                return;
            }
        }

        tracing::info!("Launching scan {}", scan_id);
        let started = Instant::now();
        state.report.launch_attempts += 1;
        state.report.last_launch_at = Some(Utc::now());

        let outcome = self.launcher.launch(scan_id).await;
        // Nothing was submitted, so the next idle poll may try again.
        if !matches!(&outcome, Err(e) if e.launch_never_pressed()) {
            state.last_launch = Some(started);
        }

        // Outcome is advisory; the next poll reads the real status.
        match outcome {
            Ok(LaunchOutcome::Launched) => {
                tracing::debug!("Console confirmed scan {} running", scan_id);
            }
            Ok(LaunchOutcome::Unconfirmed { status_text }) => {
                tracing::warn!(
                    "Console did not confirm scan {} running, status is {:?}",
                    scan_id,
                    status_text
                );
            }
            Err(e) => {
                tracing::error!("Launch attempt for scan {} failed: {}", scan_id, e);
            }
        }
    }

    /// Monitor each scan to completion, one after another, in the given order.
    ///
    /// An error on one scan is recorded and the queue moves on. `on_result`
    /// sees each result as soon as its scan is done.
    pub async fn monitor_all<F>(&self, scan_ids: &[ScanId], mut on_result: F) -> Vec<MonitorResult>
    where
        F: FnMut(&MonitorResult) + Send,
    {
        let mut results = Vec::with_capacity(scan_ids.len());

        for &scan_id in scan_ids {
            let outcome = self.run(scan_id).await;
            match &outcome {
                Ok(report) => tracing::info!(
                    "Scan {} done: {} polls, {} launch attempts",
                    scan_id,
                    report.polls,
                    report.launch_attempts
                ),
                Err(e) => tracing::error!("Scan {} could not be monitored: {}", scan_id, e),
            }
            let result = MonitorResult { scan_id, outcome };
            on_result(&result);
            results.push(result);
        }

        results
    }
}
