use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found after {waited:?}: {locator}")]
    SelectorNotFound { locator: String, waited: Duration },

    #[error("interaction with {locator} failed: {reason}")]
    InteractionError { locator: String, reason: String },

    #[error("browser session already closed")]
    SessionClosed,
}
