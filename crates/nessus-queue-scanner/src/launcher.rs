//! Launching idle scans through the Nessus web console.
//!
//! The REST API used by the directory cannot start a scan, so a launch signs
//! in to the console with a fresh browser session and presses the scan's
//! launch button. Every session is closed before `launch` returns, whatever
//! the outcome.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use nessus_queue_browser::{BrowserActions, BrowserError, Locator, SessionFactory};
use nessus_queue_core::{BrowserConfig, ConsoleConfig, Credentials, ScanId};
use std::time::Duration;
use tokio::time::Instant;
use zeroize::Zeroizing;

/// What the console showed after the launch button was pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The status indicator read `running`
    Launched,
    /// The status indicator showed something else before the wait ran out
    Unconfirmed {
        /// Last status text observed, verbatim
        status_text: String,
    },
}

/// Starts a scan that is currently idle.
#[async_trait]
pub trait ScanLauncher: Send + Sync {
    /// Trigger a run of `scan_id`.
    ///
    /// Failures before anything was submitted are reported as
    /// [`ScanError::NotLaunched`].
    async fn launch(&self, scan_id: ScanId) -> Result<LaunchOutcome>;
}

#[derive(Debug, Clone)]
struct ConsoleLocators {
    username: Locator,
    password: Locator,
    remember_me: Locator,
    sign_in: Locator,
    launch: Locator,
    status: Locator,
}

impl From<&ConsoleConfig> for ConsoleLocators {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            username: Locator::css(&config.username_selector),
            password: Locator::css(&config.password_selector),
            remember_me: Locator::css(&config.remember_me_selector),
            sign_in: Locator::css(&config.sign_in_selector),
            launch: Locator::css(&config.launch_selector),
            status: Locator::xpath(&config.status_xpath),
        }
    }
}

/// `ScanLauncher` that drives the Nessus web console.
pub struct ConsoleLauncher<F> {
    sessions: F,
    base_url: String,
    username: Zeroizing<String>,
    password: Zeroizing<String>,
    locators: ConsoleLocators,
    element_timeout: Duration,
    status_timeout: Duration,
    poll_interval: Duration,
}

impl<F: SessionFactory> ConsoleLauncher<F> {
    /// Create a launcher that opens sessions from `sessions`.
    pub fn new(
        sessions: F,
        credentials: &Credentials,
        console: &ConsoleConfig,
        browser: &BrowserConfig,
    ) -> Self {
        Self {
            sessions,
            base_url: credentials.base_url.clone(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            locators: ConsoleLocators::from(console),
            element_timeout: browser.element_timeout(),
            status_timeout: browser.status_timeout(),
            poll_interval: browser.poll_interval(),
        }
    }

    /// Console page listing the hosts of `scan_id`; it redirects through
    /// the sign-in form when there is no session.
    #[must_use]
    pub fn hosts_url(&self, scan_id: ScanId) -> String {
        format!("{}/#/scans/reports/{}/hosts", self.base_url, scan_id)
    }

    async fn press_launch(
        &self,
        session: &F::Session,
        scan_id: ScanId,
    ) -> nessus_queue_browser::Result<()> {
        session.navigate(&self.hosts_url(scan_id)).await?;

        // The login form is rendered client-side after the page loads.
        session
            .wait_for(&self.locators.username, self.element_timeout)
            .await?;
        session
            .fill_field(&self.locators.username, &self.username)
            .await?;
        session
            .fill_field(&self.locators.password, &self.password)
            .await?;
        session.click(&self.locators.remember_me).await?;
        session.click(&self.locators.sign_in).await?;
        tracing::debug!("Signed in to console for scan {}", scan_id);

        session
            .wait_for(&self.locators.launch, self.element_timeout)
            .await?;
        session.click(&self.locators.launch).await?;
        tracing::debug!("Pressed launch for scan {}", scan_id);
        Ok(())
    }

    /// Re-read the status indicator until it says `running` or the status
    /// window closes. Every read is bounded by what is left of the window.
    async fn await_running(&self, session: &F::Session) -> Result<LaunchOutcome> {
        let deadline = Instant::now() + self.status_timeout;
        let mut last_seen: Option<String> = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match session.extract_text(&self.locators.status, remaining).await {
                Ok(text) if text.eq_ignore_ascii_case("running") => {
                    return Ok(LaunchOutcome::Launched);
                }
                Ok(text) => last_seen = Some(text),
                Err(BrowserError::SelectorNotFound { .. }) if last_seen.is_some() => {
                    tracing::debug!("Status indicator went away, keeping last text");
                }
                Err(e) => return Err(e.into()),
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(LaunchOutcome::Unconfirmed {
                    status_text: last_seen.unwrap_or_default(),
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

#[async_trait]
impl<F: SessionFactory> ScanLauncher for ConsoleLauncher<F> {
    async fn launch(&self, scan_id: ScanId) -> Result<LaunchOutcome> {
        let mut session = self
            .sessions
            .open()
            .await
            .map_err(|source| ScanError::NotLaunched { scan_id, source })?;

        let outcome = match self.press_launch(&session, scan_id).await {
            Ok(()) => self.await_running(&session).await,
            Err(source) => Err(ScanError::NotLaunched { scan_id, source }),
        };

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser session for scan {}: {}", scan_id, e);
        }

        match &outcome {
            Ok(LaunchOutcome::Launched) => {
                tracing::info!("Scan {} is running", scan_id);
            }
            Ok(LaunchOutcome::Unconfirmed { status_text }) => {
                tracing::warn!("Scan {} status after launch is {:?}", scan_id, status_text);
            }
            Err(e) => {
                tracing::warn!("Launch of scan {} failed: {}", scan_id, e);
            }
        }

        outcome
    }
}
