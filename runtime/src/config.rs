//! Run configuration.
//!
//! Defaults, optionally overlaid by a JSON file; the binary then applies
//! command-line and environment overrides on top.

use crate::error::HarvestError;
use crate::navigation::NavigatorConfig;
use crate::renderer::chromium::LaunchOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.nyse.com";
pub const DEFAULT_OUTPUT_DIR: &str = "web_scraper_output";
pub const DEFAULT_OUTPUT_FILE: &str = "nyse_auction_data_consolidated.csv";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Everything a harvest run can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Scheme and host of the auction data site.
    pub base_url: String,
    pub headless: bool,
    /// Bound on page load and on chart readiness, each.
    pub timeout_seconds: u64,
    pub settle_delay_seconds: f64,
    pub poll_interval_ms: u64,
    /// Reserved for a transport-level retry layer; the harvest loop never retries.
    pub retry_attempts: u32,
    pub log_level: String,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub chromium_path: Option<PathBuf>,
    pub no_sandbox: bool,
    pub user_agent: Option<String>,
    /// Append one JSON line per pair here when set.
    pub ledger_path: Option<PathBuf>,
    pub progress: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            timeout_seconds: 30,
            settle_delay_seconds: 3.0,
            poll_interval_ms: 250,
            retry_attempts: 3,
            log_level: "info".to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            chromium_path: None,
            no_sandbox: true,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            ledger_path: None,
            progress: true,
        }
    }
}

impl HarvestConfig {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, HarvestError> {
        let text = std::fs::read_to_string(path).map_err(|e| HarvestError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| HarvestError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate().map_err(|reason| HarvestError::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_seconds == 0 {
            return Err("timeout_seconds must be positive".to_string());
        }
        if !self.settle_delay_seconds.is_finite() || self.settle_delay_seconds < 0.0 {
            return Err("settle_delay_seconds must be a non-negative number".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be positive".to_string());
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("base_url {:?} is not a valid URL", self.base_url));
        }
        if self.output_file.is_empty() {
            return Err("output_file must not be empty".to_string());
        }
        Ok(())
    }

    pub fn navigator(&self) -> NavigatorConfig {
        NavigatorConfig {
            timeout: Duration::from_secs(self.timeout_seconds),
            settle_delay: Duration::from_secs_f64(self.settle_delay_seconds),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            headless: self.headless,
            executable: self.chromium_path.clone(),
            no_sandbox: self.no_sandbox,
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.timeout_seconds),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}
