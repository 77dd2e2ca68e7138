//! The browser capability surface the step runner drives.
//!
//! The runner never talks to a browser engine directly; it consumes
//! this trait. Production uses the agent-browser backed
//! [`BrowserSession`](crate::browser::BrowserSession), tests supply a
//! scripted implementation.

use async_trait::async_trait;
use std::path::Path;

use crate::core::Result;
use crate::step::ConsoleEvent;

/// One open browser page, exclusively owned by a run.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate the page to an absolute URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// Click an element matching a CSS selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Fill an input element with text
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Evaluate a JavaScript expression, returning its string form
    async fn eval(&self, script: &str) -> Result<String>;

    /// Wait until an element matching the selector is visible
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<()>;

    /// Wait until the given text appears on the page
    async fn wait_for_text(&self, text: &str, timeout_ms: u64) -> Result<()>;

    /// Text content of the first element matching the selector
    async fn text_of(&self, selector: &str) -> Result<String>;

    /// Attribute value of the first element matching the selector,
    /// None when the attribute is absent
    async fn attribute_of(&self, selector: &str, attribute: &str) -> Result<Option<String>>;

    /// Whether an element matching the selector is present and visible
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    /// Write a screenshot to the given path
    async fn screenshot(&self, path: &Path, full_page: bool) -> Result<()>;

    /// Return console/page-error telemetry that arrived since the
    /// previous drain, in browser-emission order
    async fn drain_console(&self) -> Result<Vec<ConsoleEvent>>;
}
