//! Browser automation for the Nessus web console.
//!
//! Provides headless Chrome control through chromiumoxide, with element
//! lookups that wait for client-side rendering instead of sleeping.

pub mod actions;
pub mod engine;
pub mod error;

pub use actions::{wait_until, BrowserActions, Locator, SessionFactory};
pub use engine::{BrowserEngine, BrowserSession};
pub use error::{BrowserError, Result};
