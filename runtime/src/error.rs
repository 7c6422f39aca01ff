//! Error taxonomy for a harvest run.
//!
//! Only [`InvalidRangeError`] and export failures end a run. Navigation
//! failures and extraction anomalies are recovered per pair.

use crate::model::AuctionType;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A date range that cannot be expanded into business days.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRangeError {
    /// A bound is not a valid `MM-DD-YYYY` date.
    #[error("unparseable {bound} date {value:?} (expected MM-DD-YYYY)")]
    Unparseable {
        /// Which bound failed, `start` or `end`.
        bound: &'static str,
        /// The raw input.
        value: String,
    },

    /// The end date precedes the start date.
    #[error("end date {end} is before start date {start}")]
    Inverted {
        /// Formatted start date.
        start: String,
        /// Formatted end date.
        end: String,
    },
}

/// Why a page could not be brought to a ready state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationFailure {
    /// The browser reported an error while loading the page.
    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },

    /// The page did not finish loading within the timeout.
    #[error("timed out after {timeout:?} loading {url}")]
    LoadTimeout { url: String, timeout: Duration },

    /// The page loaded but the charts never rendered.
    #[error("charts not ready on {url} after {timeout:?}")]
    ReadinessTimeout { url: String, timeout: Duration },
}

/// Something off about the chart layout. The affected slot is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionAnomaly {
    /// Charts are assigned three per heading by position, so any other
    /// count means metrics may be misassigned.
    #[error("found {charts} chart(s) for {headings} heading(s), expected {}", .headings * crate::extraction::charts::CHARTS_PER_HEADING)]
    ChartCountMismatch { headings: usize, charts: usize },

    /// Two headings classified to the same auction; the later one was kept.
    #[error("duplicate {phase} heading {heading:?}")]
    DuplicatePhase { phase: AuctionType, heading: String },

    /// No chart instance (or no series) in this slot.
    #[error("{phase} {slot} chart missing")]
    MissingChart { phase: AuctionType, slot: &'static str },

    /// `times` and `values` disagree in length.
    #[error("{phase} {slot} chart has {times} categories but {values} points")]
    MisalignedSeries {
        phase: AuctionType,
        slot: &'static str,
        times: usize,
        values: usize,
    },

    /// The slot's data did not have the expected shape.
    #[error("{phase} {slot} chart malformed: {reason}")]
    MalformedSeries {
        phase: AuctionType,
        slot: &'static str,
        reason: String,
    },
}

/// Why a single (symbol, date) pair contributed no records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairFailure {
    #[error(transparent)]
    Navigation(#[from] NavigationFailure),

    /// The in-page chart query itself failed or returned garbage.
    #[error("chart extraction failed: {0}")]
    Extraction(String),
}

/// Fatal errors that end a run.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// The browser could not be launched or a page could not be opened.
    #[error("browser unavailable: {0}")]
    Browser(String),

    /// The consolidated output could not be written.
    #[error("failed to export records to {path}: {reason}")]
    Export { path: PathBuf, reason: String },
}

impl HarvestError {
    pub(crate) fn export(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Export {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
