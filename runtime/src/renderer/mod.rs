//! Browser rendering seam.
//!
//! Everything above this module talks to a page through [`RenderContext`],
//! so the navigation and extraction logic never touches CDP types directly.

pub mod chromium;
#[cfg(test)]
pub(crate) mod scripted;

use anyhow::Result;
use async_trait::async_trait;

/// Outcome of loading a URL in a context.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationResult {
    /// URL after redirects.
    pub final_url: String,
    /// Time spent in the page load itself, excluding readiness polling.
    pub load_time_ms: u64,
}

/// A live page that can be navigated and queried.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Load `url` and wait for the browser's load event.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;

    /// Evaluate a script expression against the live page and return its value.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;

    /// Close the page.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A browser process that hands out page contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a fresh page context.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;

    /// Shut the browser down. Called once, after every context is closed.
    async fn shutdown(&mut self) -> Result<()>;
}
