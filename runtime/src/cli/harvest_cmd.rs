//! `auction-harvest <SYMBOLS>... --start --end`: harvest a date range.

use crate::audit::RunLedger;
use crate::calendar;
use crate::cli::output;
use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::export::CsvExporter;
use crate::harvest::{Harvester, RunSummary};
use crate::navigation::Navigator;
use crate::renderer::chromium::ChromiumRenderer;
use crate::site::AuctionSite;
use tracing::{info, warn};

/// Run a full harvest and report the outcome.
pub async fn run(
    config: &HarvestConfig,
    symbols: &[String],
    start: &str,
    end: &str,
    json: bool,
) -> Result<RunSummary, HarvestError> {
    // Range errors surface before any browser work.
    let dates = calendar::business_days(start, end)?;
    if dates.is_empty() {
        warn!("no business days between {start} and {end}");
    }

    let site = AuctionSite::new(&config.base_url).map_err(|e| HarvestError::Config {
        path: "base_url".into(),
        reason: e.to_string(),
    })?;

    info!(
        "timeout {}s, settle {}s, retry_attempts {} (reserved)",
        config.timeout_seconds, config.settle_delay_seconds, config.retry_attempts
    );

    let mut harvester =
        Harvester::new(site, Navigator::new(config.navigator())).with_progress(config.progress && !json);
    if let Some(path) = &config.ledger_path {
        match RunLedger::open(path) {
            Ok(ledger) => harvester = harvester.with_ledger(ledger),
            Err(e) => warn!("run ledger disabled: {e:#}"),
        }
    }

    let mut renderer = ChromiumRenderer::launch(&config.launch_options())
        .await
        .map_err(|e| HarvestError::Browser(format!("{e:#}")))?;
    let mut exporter = CsvExporter::new(config.output_path());

    let summary = harvester
        .run(&mut renderer, symbols, &dates, &mut exporter)
        .await?;

    if json {
        output::print_json(&serde_json::to_value(&summary).unwrap_or_default());
    } else {
        output::print_summary(&summary);
    }
    Ok(summary)
}
