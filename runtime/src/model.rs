//! Requests, raw chart bundles, and the flat records they become.

use crate::calendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One (symbol, trading date) pair to harvest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuctionRequest {
    pub symbol: String,
    pub date: NaiveDate,
}

impl AuctionRequest {
    pub fn new(symbol: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            date,
        }
    }

    /// The trading date as `MM-DD-YYYY`.
    pub fn date_param(&self) -> String {
        calendar::format_date(self.date)
    }
}

impl fmt::Display for AuctionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.symbol, self.date_param())
    }
}

/// A single chart point: the plotted value and its rendered data label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Null when the chart plots a gap at this category.
    pub y: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

/// One chart's x-axis categories and its first series' points.
///
/// `times[i]` pairs with `values[i]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesData {
    pub times: Vec<String>,
    pub values: Vec<SeriesPoint>,
}

impl SeriesData {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.times.len() == self.values.len()
    }
}

/// The three chart slots under one auction heading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseData {
    pub imbalance: Option<SeriesData>,
    pub paired: Option<SeriesData>,
    pub price: Option<SeriesData>,
}

impl PhaseData {
    pub fn slot(&self, slot: ChartSlot) -> Option<&SeriesData> {
        match slot {
            ChartSlot::Imbalance => self.imbalance.as_ref(),
            ChartSlot::Paired => self.paired.as_ref(),
            ChartSlot::Price => self.price.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: ChartSlot) -> &mut Option<SeriesData> {
        match slot {
            ChartSlot::Imbalance => &mut self.imbalance,
            ChartSlot::Paired => &mut self.paired,
            ChartSlot::Price => &mut self.price,
        }
    }

    pub fn is_empty(&self) -> bool {
        ChartSlot::ALL.iter().all(|s| self.slot(*s).is_none())
    }
}

/// Everything the chart query pulled from one page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawChartBundle {
    pub opening: Option<PhaseData>,
    pub closing: Option<PhaseData>,
}

impl RawChartBundle {
    pub fn phase(&self, auction: AuctionType) -> Option<&PhaseData> {
        match auction {
            AuctionType::Opening => self.opening.as_ref(),
            AuctionType::Closing => self.closing.as_ref(),
        }
    }

    pub fn phase_mut(&mut self, auction: AuctionType) -> &mut Option<PhaseData> {
        match auction {
            AuctionType::Opening => &mut self.opening,
            AuctionType::Closing => &mut self.closing,
        }
    }

    /// Number of points across every present slot.
    pub fn point_count(&self) -> usize {
        AuctionType::ALL
            .iter()
            .filter_map(|a| self.phase(*a))
            .flat_map(|p| ChartSlot::ALL.iter().filter_map(move |s| p.slot(*s)))
            .map(SeriesData::len)
            .sum()
    }
}

/// Opening or closing auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionType {
    Opening,
    Closing,
}

impl AuctionType {
    pub const ALL: [AuctionType; 2] = [AuctionType::Opening, AuctionType::Closing];

    /// Classify a chart heading by its visible text.
    pub fn from_heading(text: &str) -> Self {
        if text.contains("Opening") {
            AuctionType::Opening
        } else {
            AuctionType::Closing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionType::Opening => "opening",
            AuctionType::Closing => "closing",
        }
    }
}

impl fmt::Display for AuctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart position within a heading's triplet. Page-internal naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Imbalance,
    Paired,
    Price,
}

impl ChartSlot {
    /// Document order of the three charts under each heading.
    pub const ALL: [ChartSlot; 3] = [ChartSlot::Imbalance, ChartSlot::Paired, ChartSlot::Price];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartSlot::Imbalance => "imbalance",
            ChartSlot::Paired => "paired",
            ChartSlot::Price => "price",
        }
    }

    /// The published metric this slot feeds.
    pub fn metric(&self) -> Metric {
        match self {
            ChartSlot::Imbalance => Metric::Imbalance,
            ChartSlot::Paired => Metric::PairedQuantity,
            ChartSlot::Price => Metric::ClearingPrice,
        }
    }
}

/// Metric names as they appear in the output dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Imbalance,
    PairedQuantity,
    ClearingPrice,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Imbalance => "imbalance",
            Metric::PairedQuantity => "paired_quantity",
            Metric::ClearingPrice => "clearing_price",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuctionRecord {
    pub symbol: String,
    /// `MM-DD-YYYY`.
    pub date: String,
    pub auction_type: AuctionType,
    pub metric: Metric,
    pub time: String,
    pub value: Option<f64>,
    pub label: Option<String>,
}

/// Records harvested from a single request.
pub type RecordBatch = Vec<AuctionRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize) -> SeriesData {
        SeriesData {
            times: (0..n).map(|i| format!("09:{:02}:00", i)).collect(),
            values: (0..n)
                .map(|i| SeriesPoint {
                    y: Some(i as f64),
                    label: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_heading_classification_is_case_sensitive() {
        assert_eq!(
            AuctionType::from_heading("Opening Auction Imbalance"),
            AuctionType::Opening
        );
        assert_eq!(
            AuctionType::from_heading("Closing Auction Imbalance"),
            AuctionType::Closing
        );
        assert_eq!(AuctionType::from_heading("opening"), AuctionType::Closing);
        assert_eq!(AuctionType::from_heading(""), AuctionType::Closing);
    }

    #[test]
    fn test_slot_metric_mapping() {
        assert_eq!(ChartSlot::Imbalance.metric().as_str(), "imbalance");
        assert_eq!(ChartSlot::Paired.metric().as_str(), "paired_quantity");
        assert_eq!(ChartSlot::Price.metric().as_str(), "clearing_price");
    }

    #[test]
    fn test_point_count() {
        let bundle = RawChartBundle {
            opening: Some(PhaseData {
                imbalance: Some(series(3)),
                paired: None,
                price: Some(series(2)),
            }),
            closing: Some(PhaseData {
                imbalance: Some(series(4)),
                ..Default::default()
            }),
        };
        assert_eq!(bundle.point_count(), 9);
        assert_eq!(RawChartBundle::default().point_count(), 0);
    }

    #[test]
    fn test_series_point_label_defaults_to_none() {
        let point: SeriesPoint = serde_json::from_str(r#"{"y": 12.5}"#).unwrap();
        assert_eq!(point.y, Some(12.5));
        assert!(point.label.is_none());
    }

    #[test]
    fn test_request_display() {
        let req = AuctionRequest::new("WFC", NaiveDate::from_ymd_opt(2024, 12, 2).unwrap());
        assert_eq!(req.date_param(), "12-02-2024");
        assert_eq!(req.to_string(), "WFC on 12-02-2024");
    }
}
