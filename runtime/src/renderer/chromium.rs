//! Chromium renderer over the DevTools protocol.

use super::{NavigationResult, RenderContext, Renderer};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Environment override for the browser binary.
pub const CHROMIUM_PATH_ENV: &str = "AUCTION_HARVEST_CHROMIUM_PATH";

const WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Launch options for [`ChromiumRenderer`].
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub no_sandbox: bool,
    pub user_agent: Option<String>,
    /// CDP request timeout; also bounds a single `goto`.
    pub request_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            no_sandbox: true,
            user_agent: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Locate a Chromium-family binary.
///
/// Order: explicit path, `AUCTION_HARVEST_CHROMIUM_PATH`, then `PATH`.
pub fn find_chromium(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.clone());
        }
        warn!("configured chromium path {} does not exist", path.display());
    }

    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// A launched Chromium process plus the task pumping its CDP handler.
pub struct ChromiumRenderer {
    browser: Browser,
    handler_task: Option<JoinHandle<()>>,
    user_agent: Option<String>,
}

impl ChromiumRenderer {
    /// Launch the browser.
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(WINDOW_SIZE.0, WINDOW_SIZE.1)
            .request_timeout(options.request_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        if !options.headless {
            builder = builder.with_head();
        }
        if options.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = find_chromium(options.executable.as_ref()) {
            debug!("using chromium at {}", path.display());
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow!("invalid browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("launching chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("cdp handler: {e}");
                }
            }
        });

        info!(
            "chromium launched ({})",
            if options.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            browser,
            handler_task: Some(handler_task),
            user_agent: options.user_agent.clone(),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("opening page")?;
        if let Some(ua) = &self.user_agent {
            page.set_user_agent(ua.clone())
                .await
                .context("setting user agent")?;
        }
        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("waiting for chromium to exit: {e}");
        }
        if let Some(task) = self.handler_task.take() {
            let _ = task.await;
        }
        closed.context("closing chromium")?;
        info!("chromium closed");
        Ok(())
    }
}

/// A single Chromium tab.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();
        tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url))
            .await
            .map_err(|_| anyhow!("page load exceeded {timeout_ms}ms"))?
            .with_context(|| format!("navigating to {url}"))?;

        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("evaluating script")?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.context("closing page")
    }
}
