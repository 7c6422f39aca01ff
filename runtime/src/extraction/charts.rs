//! Highcharts series extraction for the auction data page.
//!
//! The page renders one heading per auction followed by three charts in a
//! fixed order: imbalance, paired quantity, clearing price. Nothing on the
//! page tags a chart with its metric, so assignment is positional. The query
//! also reports the heading texts and chart count so a layout change shows
//! up as an [`ExtractionAnomaly`] instead of silently shuffled metrics.

use crate::error::{ExtractionAnomaly, PairFailure};
use crate::model::{AuctionType, ChartSlot, PhaseData, RawChartBundle, SeriesData};
use crate::renderer::RenderContext;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Selector for the headings that introduce each auction's charts.
pub const HEADING_SELECTOR: &str = "h6.mb-4.pl-8.text-black";

/// Charts rendered under each heading.
pub const CHARTS_PER_HEADING: usize = 3;

const CHART_QUERY: &str = r#"
(function() {
    function seriesData(chart) {
        if (!chart || !chart.series || !chart.series[0]) return null;
        var axis = chart.xAxis && chart.xAxis[0];
        return {
            times: axis ? axis.categories : null,
            values: chart.series[0].points.map(function(point) {
                return {
                    y: point.y,
                    label: point.dataLabel ? point.dataLabel.textStr : null
                };
            })
        };
    }

    var charts = (typeof Highcharts !== 'undefined' && Highcharts.charts) ? Highcharts.charts : [];
    var headers = Array.from(document.querySelectorAll('__HEADING_SELECTOR__'));
    var result = { opening: {}, closing: {}, headings: [], chart_count: charts.length };
    var chartIndex = 0;

    headers.forEach(function(header) {
        var text = header.textContent || '';
        var type = text.includes('Opening') ? 'opening' : 'closing';
        result.headings.push(text.trim());
        result[type] = {
            imbalance: seriesData(charts[chartIndex]),
            paired: seriesData(charts[chartIndex + 1]),
            price: seriesData(charts[chartIndex + 2])
        };
        chartIndex += __PER_HEADING__;
    });

    return JSON.stringify(result);
})()
"#;

/// A chart bundle and whatever looked wrong while building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartExtraction {
    pub bundle: RawChartBundle,
    pub anomalies: Vec<ExtractionAnomaly>,
}

/// Runs the chart query and shapes its result.
#[derive(Debug, Clone)]
pub struct ChartExtractor {
    script: String,
}

impl Default for ChartExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartExtractor {
    pub fn new() -> Self {
        let script = CHART_QUERY
            .replace("__HEADING_SELECTOR__", HEADING_SELECTOR)
            .replace("__PER_HEADING__", &CHARTS_PER_HEADING.to_string());
        Self { script }
    }

    /// The in-page query.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Query the live page once and build the bundle.
    pub async fn extract(&self, context: &dyn RenderContext) -> Result<ChartExtraction, PairFailure> {
        let raw = context
            .execute_js(&self.script)
            .await
            .map_err(|e| PairFailure::Extraction(format!("{e:#}")))?;
        let extraction = parse_chart_result(&raw)?;
        for anomaly in &extraction.anomalies {
            warn!("chart anomaly: {anomaly}");
        }
        Ok(extraction)
    }
}

/// Shape the query result into a bundle.
///
/// Accepts either the JSON string the query returns or an already-decoded
/// object.
pub fn parse_chart_result(raw: &Value) -> Result<ChartExtraction, PairFailure> {
    let decoded;
    let root = match raw {
        Value::String(s) => {
            decoded = serde_json::from_str::<Value>(s)
                .map_err(|e| PairFailure::Extraction(format!("invalid chart JSON: {e}")))?;
            &decoded
        }
        Value::Object(_) => raw,
        other => {
            return Err(PairFailure::Extraction(format!(
                "chart query returned {}",
                type_name(other)
            )))
        }
    };

    let mut anomalies = Vec::new();

    let headings: Vec<String> = root
        .get("headings")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|h| h.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    if let Some(charts) = root.get("chart_count").and_then(Value::as_u64) {
        let charts = charts as usize;
        if charts != headings.len() * CHARTS_PER_HEADING {
            anomalies.push(ExtractionAnomaly::ChartCountMismatch {
                headings: headings.len(),
                charts,
            });
        }
    }

    let mut seen = HashSet::new();
    for heading in &headings {
        let phase = AuctionType::from_heading(heading);
        if !seen.insert(phase) {
            anomalies.push(ExtractionAnomaly::DuplicatePhase {
                phase,
                heading: heading.clone(),
            });
        }
    }

    let mut bundle = RawChartBundle::default();
    for phase in AuctionType::ALL {
        let Some(obj) = root.get(phase.as_str()).and_then(Value::as_object) else {
            continue;
        };
        if obj.is_empty() {
            continue;
        }

        let mut data = PhaseData::default();
        for slot in ChartSlot::ALL {
            *data.slot_mut(slot) = parse_slot(phase, slot, obj.get(slot.as_str()), &mut anomalies);
        }
        *bundle.phase_mut(phase) = Some(data);
    }

    Ok(ChartExtraction { bundle, anomalies })
}

fn parse_slot(
    phase: AuctionType,
    slot: ChartSlot,
    value: Option<&Value>,
    anomalies: &mut Vec<ExtractionAnomaly>,
) -> Option<SeriesData> {
    let value = match value {
        None | Some(Value::Null) => {
            anomalies.push(ExtractionAnomaly::MissingChart {
                phase,
                slot: slot.as_str(),
            });
            return None;
        }
        Some(v) => v,
    };

    let series: SeriesData = match serde_json::from_value(value.clone()) {
        Ok(s) => s,
        Err(e) => {
            anomalies.push(ExtractionAnomaly::MalformedSeries {
                phase,
                slot: slot.as_str(),
                reason: e.to_string(),
            });
            return None;
        }
    };

    if !series.is_aligned() {
        anomalies.push(ExtractionAnomaly::MisalignedSeries {
            phase,
            slot: slot.as_str(),
            times: series.times.len(),
            values: series.values.len(),
        });
        return None;
    }

    Some(series)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
