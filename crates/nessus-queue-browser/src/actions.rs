use crate::error::{BrowserError, Result};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// How to find an element on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "css `{selector}`"),
            Self::XPath(expression) => write!(f, "xpath `{expression}`"),
        }
    }
}

/// Browser actions for automation.
///
/// Element lookups in `fill_field` and `click` wait for the element to
/// appear, bounded by the session's element timeout.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Type a value into a form field
    async fn fill_field(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Wait for an element to appear
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Extract the trimmed text content of an element, waiting at most
    /// `timeout` for it to appear
    async fn extract_text(&self, locator: &Locator, timeout: Duration) -> Result<String>;

    /// Shut the browser down. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Opens fresh, exclusively owned browser sessions.
#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: BrowserActions;

    async fn open(&self) -> Result<Self::Session>;
}

/// Poll `probe` every `interval` until it yields a value or `timeout` elapses.
///
/// The probe always runs at least once, even with a zero timeout.
pub async fn wait_until<T, F, Fut>(
    locator: &Locator,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();
    let deadline = started + timeout;

    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!("Gave up waiting for {} after {:?}", locator, now - started);
            return Err(BrowserError::SelectorNotFound {
                locator: locator.to_string(),
                waited: timeout,
            });
        }

        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Check that a string is an absolute http(s) URL before handing it to Chrome.
pub fn validate_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL {url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(BrowserError::NavigationError(format!(
            "Unsupported scheme {other} in {url}"
        ))),
    }
}
