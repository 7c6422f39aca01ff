//! Run orchestration: symbols × dates through navigate → extract → normalize.
//!
//! One browser page is reused for every pair, sequentially. A failing pair is
//! logged and skipped; only export failures end the run, and the browser is
//! torn down exactly once either way.

use crate::audit::RunLedger;
use crate::error::{ExtractionAnomaly, HarvestError, PairFailure};
use crate::export::RecordExporter;
use crate::extraction::ChartExtractor;
use crate::model::{AuctionRecord, AuctionRequest, RecordBatch};
use crate::navigation::{Navigator, ReadinessProbe};
use crate::normalize::normalize;
use crate::renderer::{RenderContext, Renderer};
use crate::site::AuctionSite;
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Records and anomalies from one successful pair.
#[derive(Debug, Clone, Default)]
pub struct PairHarvest {
    pub records: RecordBatch,
    pub anomalies: Vec<ExtractionAnomaly>,
}

/// A pair that contributed nothing, and why.
#[derive(Debug, Clone, Serialize)]
pub struct FailedPair {
    pub symbol: String,
    pub date: String,
    pub reason: String,
}

/// Everything gathered before export.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub records: Vec<AuctionRecord>,
    pub pairs: usize,
    pub failed: Vec<FailedPair>,
    pub anomalies: usize,
}

/// What a finished run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Option<String>,
    pub pairs: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedPair>,
    pub records: usize,
    pub anomalies: usize,
    pub output: PathBuf,
    pub elapsed_ms: u64,
}

/// The cross product of symbols and dates, symbols outermost.
pub fn requests(symbols: &[String], dates: &[NaiveDate]) -> Vec<AuctionRequest> {
    symbols
        .iter()
        .flat_map(|symbol| dates.iter().map(move |date| AuctionRequest::new(symbol.clone(), *date)))
        .collect()
}

/// Drives a run against one site.
pub struct Harvester {
    site: AuctionSite,
    navigator: Navigator,
    probe: ReadinessProbe,
    extractor: ChartExtractor,
    ledger: Option<RunLedger>,
    progress: bool,
}

impl Harvester {
    pub fn new(site: AuctionSite, navigator: Navigator) -> Self {
        Self {
            site,
            navigator,
            probe: ReadinessProbe::highcharts(),
            extractor: ChartExtractor::new(),
            ledger: None,
            progress: false,
        }
    }

    pub fn with_ledger(mut self, ledger: RunLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Harvest one pair. Never touches shared state.
    pub async fn harvest_pair(
        &self,
        context: &mut dyn RenderContext,
        request: &AuctionRequest,
    ) -> Result<PairHarvest, PairFailure> {
        let url = self.site.url_for(request);
        self.navigator
            .try_navigate(context, &url, &self.probe)
            .await?;
        let limit = self.navigator.config().timeout;
        let extraction = tokio::time::timeout(limit, self.extractor.extract(&*context))
            .await
            .map_err(|_| PairFailure::Extraction(format!("chart query exceeded {limit:?}")))??;
        Ok(PairHarvest {
            records: normalize(request, &extraction.bundle),
            anomalies: extraction.anomalies,
        })
    }

    /// Walk the full cross product, accumulating records.
    pub async fn collect(
        &mut self,
        context: &mut dyn RenderContext,
        symbols: &[String],
        dates: &[NaiveDate],
    ) -> Harvest {
        let requests = requests(symbols, dates);
        let bar = self.progress_bar(requests.len() as u64);
        let mut harvest = Harvest {
            pairs: requests.len(),
            ..Default::default()
        };

        for request in &requests {
            bar.set_message(request.to_string());
            let started = Instant::now();
            let outcome = self.harvest_pair(context, request).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let (count, anomalies, error) = match outcome {
                Ok(pair) => {
                    let count = pair.records.len();
                    let anomalies = pair.anomalies.len();
                    harvest.records.extend(pair.records);
                    harvest.anomalies += anomalies;
                    info!("{request}: {count} record(s)");
                    (count, anomalies, None)
                }
                Err(e) => {
                    warn!("failed to harvest {request}: {e}");
                    harvest.failed.push(FailedPair {
                        symbol: request.symbol.clone(),
                        date: request.date_param(),
                        reason: e.to_string(),
                    });
                    (0, 0, Some(e.to_string()))
                }
            };

            if let Some(ledger) = self.ledger.as_mut() {
                let url = self.site.url_for(request);
                if let Err(e) = ledger.log_pair(
                    &request.symbol,
                    &request.date_param(),
                    &url,
                    count,
                    anomalies,
                    duration_ms,
                    error.as_deref(),
                ) {
                    warn!("run ledger write failed: {e:#}");
                }
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        harvest
    }

    /// Full run: open a page, collect, export, and release the browser.
    pub async fn run(
        &mut self,
        renderer: &mut dyn Renderer,
        symbols: &[String],
        dates: &[NaiveDate],
        exporter: &mut dyn RecordExporter,
    ) -> Result<RunSummary, HarvestError> {
        let started = Instant::now();
        info!(
            "harvesting {} symbol(s) x {} date(s)",
            symbols.len(),
            dates.len()
        );

        let mut context = match renderer.new_context().await {
            Ok(context) => context,
            Err(e) => {
                release(None, renderer).await;
                return Err(HarvestError::Browser(format!("{e:#}")));
            }
        };

        let harvest = self.collect(context.as_mut(), symbols, dates).await;
        let exported = exporter.export(&harvest.records);
        release(Some(context), renderer).await;
        let output = exported?;

        let summary = RunSummary {
            run_id: self.ledger.as_ref().map(|l| l.run_id().to_string()),
            pairs: harvest.pairs,
            succeeded: harvest.pairs - harvest.failed.len(),
            failed: harvest.failed,
            records: harvest.records.len(),
            anomalies: harvest.anomalies,
            output,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "run complete: {}/{} pair(s), {} record(s)",
            summary.succeeded, summary.pairs, summary.records
        );
        Ok(summary)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar
    }
}

/// Close the page and shut the browser down. Errors are logged, not raised.
async fn release(context: Option<Box<dyn RenderContext>>, renderer: &mut dyn Renderer) {
    if let Some(context) = context {
        if let Err(e) = context.close().await {
            warn!("error closing page: {e:#}");
        }
    }
    if let Err(e) = renderer.shutdown().await {
        warn!("error closing browser: {e:#}");
    }
}
