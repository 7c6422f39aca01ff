//! auction-harvest command-line entry point.

use anyhow::Result;
use auction_harvest::cli::harvest_cmd;
use auction_harvest::config::HarvestConfig;
use auction_harvest::logging;
use clap::Parser;
use std::path::PathBuf;

/// Harvest NYSE opening/closing auction imbalance charts into a single CSV.
#[derive(Parser, Debug)]
#[command(name = "auction-harvest", version, about, long_about = None)]
struct Cli {
    /// Ticker symbols to harvest
    #[arg(required = true, num_args = 1..)]
    symbols: Vec<String>,

    /// First trading date (MM-DD-YYYY)
    #[arg(long)]
    start: String,

    /// Last trading date, inclusive (MM-DD-YYYY)
    #[arg(long)]
    end: String,

    /// JSON configuration file
    #[arg(short, long, env = "AUCTION_HARVEST_CONFIG")]
    config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Seconds allowed for page load and for chart readiness
    #[arg(long, env = "AUCTION_HARVEST_TIMEOUT")]
    timeout: Option<u64>,

    /// Seconds to wait after the charts are ready
    #[arg(long)]
    settle_delay: Option<f64>,

    /// Reserved for transport-level retries
    #[arg(long)]
    retry_attempts: Option<u32>,

    /// Log level for this crate (overridden by RUST_LOG)
    #[arg(long, env = "AUCTION_HARVEST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Site scheme and host
    #[arg(long, env = "AUCTION_HARVEST_BASE_URL")]
    base_url: Option<String>,

    /// Directory for the consolidated CSV
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// File name of the consolidated CSV
    #[arg(long)]
    output_file: Option<String>,

    /// Chromium binary to launch
    #[arg(long)]
    chromium_path: Option<PathBuf>,

    /// Append per-pair outcomes to this JSONL file
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };

        if self.headed {
            config.headless = false;
        }
        if let Some(v) = self.timeout {
            config.timeout_seconds = v;
        }
        if let Some(v) = self.settle_delay {
            config.settle_delay_seconds = v;
        }
        if let Some(v) = self.retry_attempts {
            config.retry_attempts = v;
        }
        if let Some(v) = &self.log_level {
            config.log_level = v.clone();
        }
        if let Some(v) = &self.base_url {
            config.base_url = v.clone();
        }
        if let Some(v) = &self.output_dir {
            config.output_dir = v.clone();
        }
        if let Some(v) = &self.output_file {
            config.output_file = v.clone();
        }
        if let Some(v) = &self.chromium_path {
            config.chromium_path = Some(v.clone());
        }
        if let Some(v) = &self.ledger {
            config.ledger_path = Some(v.clone());
        }
        if self.no_progress {
            config.progress = false;
        }

        config
            .validate()
            .map_err(|reason| anyhow::anyhow!("invalid configuration: {reason}"))?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    logging::init(&config.log_level, cli.log_json)?;

    harvest_cmd::run(&config, &cli.symbols, &cli.start, &cli.end, cli.json).await?;
    Ok(())
}
