//! Browser automation port
//!
//! The crawler only ever talks to these two traits. Element handles are
//! opaque and stay valid until the page navigates again.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from the automation engine
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {timeout:?} waiting for {selector}")]
    Timeout { selector: String, timeout: Duration },

    #[error("Invalid selector {0}")]
    InvalidSelector(String),

    #[error("Stale or unknown element handle {0}")]
    StaleElement(usize),

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Opaque handle to an element on a [`BrowserPage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(usize);

impl ElementRef {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// One browser tab
#[async_trait]
pub trait BrowserPage: Send {
    /// Load `url`, invalidating all element handles
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Wait until no network activity is pending
    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError>;

    /// Wait until `selector` matches at least one element
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    async fn query_selector_all(&mut self, selector: &str)
        -> Result<Vec<ElementRef>, BrowserError>;

    async fn query_selector(&mut self, selector: &str) -> Result<Option<ElementRef>, BrowserError> {
        Ok(self.query_selector_all(selector).await?.into_iter().next())
    }

    /// First descendant of `parent` matching `selector`
    async fn query_within(
        &mut self,
        parent: ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>, BrowserError>;

    async fn attribute(
        &mut self,
        element: ElementRef,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    async fn text_content(&mut self, element: ElementRef) -> Result<Option<String>, BrowserError>;

    async fn click(&mut self, element: ElementRef) -> Result<(), BrowserError>;

    /// Evaluate a JavaScript expression and return its JSON value
    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Source of new browser tabs
#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, BrowserError>;
}
