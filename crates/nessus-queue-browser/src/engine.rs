use crate::actions::{validate_url, wait_until, BrowserActions, Locator, SessionFactory};
use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures_util::stream::StreamExt;
use nessus_queue_core::BrowserConfig;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Browser automation engine.
///
/// Holds the launch settings; every call to [`SessionFactory::open`] starts a
/// separate Chrome process owned by the returned [`BrowserSession`].
#[derive(Debug, Clone)]
pub struct BrowserEngine {
    config: BrowserConfig,
}

impl BrowserEngine {
    /// Create a new browser engine with default configuration
    pub fn new() -> Self {
        Self::with_config(BrowserConfig::default())
    }

    /// Create a new browser engine with specific settings
    pub fn with_config(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn cdp_config(&self) -> Result<CdpBrowserConfig> {
        let mut builder = CdpBrowserConfig::builder()
            .no_sandbox()
            .window_size(self.config.window_width, self.config.window_height);

        if !self.config.headless {
            builder = builder.with_head();
        }

        if self.config.accept_invalid_certs {
            builder = builder.arg("--ignore-certificate-errors");
        }

        builder.build().map_err(BrowserError::ChromiumError)
    }
}

impl Default for BrowserEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionFactory for BrowserEngine {
    type Session = BrowserSession;

    async fn open(&self) -> Result<BrowserSession> {
        let (browser, mut handler) = Browser::launch(self.cdp_config()?)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // Dropping the browser kills the child process.
                handler.abort();
                return Err(BrowserError::ChromiumError(e.to_string()));
            }
        };

        tracing::debug!("Browser session opened");

        Ok(BrowserSession {
            browser: Some(browser),
            page,
            handler,
            element_timeout: self.config.element_timeout(),
            poll_interval: self.config.poll_interval(),
        })
    }
}

/// One Chrome process with a single page.
pub struct BrowserSession {
    browser: Option<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    element_timeout: Duration,
    poll_interval: Duration,
}

impl BrowserSession {
    async fn find(&self, locator: &Locator) -> Option<Element> {
        let found = match locator {
            Locator::Css(selector) => self.page.find_element(selector.as_str()).await,
            Locator::XPath(expression) => self.page.find_xpath(expression.as_str()).await,
        };
        found.ok()
    }

    async fn locate(&self, locator: &Locator, timeout: Duration) -> Result<Element> {
        self.ensure_open()?;
        wait_until(locator, timeout, self.poll_interval, move || self.find(locator)).await
    }

    fn ensure_open(&self) -> Result<()> {
        if self.browser.is_some() {
            Ok(())
        } else {
            Err(BrowserError::SessionClosed)
        }
    }
}

fn interaction_error(locator: &Locator, e: impl std::fmt::Display) -> BrowserError {
    BrowserError::InteractionError {
        locator: locator.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        validate_url(url)?;
        tracing::debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(e.to_string()))?;
        Ok(())
    }

    async fn fill_field(&self, locator: &Locator, value: &str) -> Result<()> {
        let element = self.locate(locator, self.element_timeout).await?;
        element
            .click()
            .await
            .map_err(|e| interaction_error(locator, e))?;
        element
            .type_str(value)
            .await
            .map_err(|e| interaction_error(locator, e))?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let element = self.locate(locator, self.element_timeout).await?;
        element
            .click()
            .await
            .map_err(|e| interaction_error(locator, e))?;
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.locate(locator, timeout).await.map(|_| ())
    }

    async fn extract_text(&self, locator: &Locator, timeout: Duration) -> Result<String> {
        let element = self.locate(locator, timeout).await?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| interaction_error(locator, e))?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if closed.is_ok() {
            // Reap the child process.
            if let Err(e) = browser.wait().await {
                tracing::debug!("Failed to reap Chrome process: {}", e);
            }
        }
        self.handler.abort();
        tracing::debug!("Browser session closed");

        closed.map(|_| ())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // A browser still present here was never closed; dropping it kills
        // the Chrome child process.
        if self.browser.is_some() {
            tracing::warn!("Browser session dropped without close");
        }
        self.handler.abort();
    }
}
