//! JSONL run ledger: one appended line per harvested pair.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// Outcome of one (symbol, date) pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairEvent {
    pub timestamp: String,
    pub run_id: String,
    pub symbol: String,
    pub date: String,
    pub url: String,
    /// `ok` or `failed`.
    pub status: String,
    pub records: usize,
    pub anomalies: usize,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Append-only JSONL ledger of pair outcomes.
pub struct RunLedger {
    file: File,
    run_id: String,
}

impl RunLedger {
    /// Open or create the ledger file under a fresh run id.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open run ledger: {}", path.display()))?;

        Ok(Self {
            file,
            run_id: Uuid::new_v4().to_string(),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Append one event.
    pub fn log(&mut self, event: &PairEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.file, "{json}")?;
        Ok(())
    }

    /// Record a pair outcome stamped with this run's id.
    #[allow(clippy::too_many_arguments)]
    pub fn log_pair(
        &mut self,
        symbol: &str,
        date: &str,
        url: &str,
        records: usize,
        anomalies: usize,
        duration_ms: u64,
        error: Option<&str>,
    ) -> Result<()> {
        self.log(&PairEvent {
            timestamp: Utc::now().to_rfc3339(),
            run_id: self.run_id.clone(),
            symbol: symbol.to_string(),
            date: date.to_string(),
            url: url.to_string(),
            status: if error.is_some() { "failed" } else { "ok" }.to_string(),
            records,
            anomalies,
            duration_ms,
            error: error.map(String::from),
        })
    }
}
