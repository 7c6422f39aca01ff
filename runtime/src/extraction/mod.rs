//! Chart extraction.
//!
//! Pulls the auction chart series out of a rendered page with a single
//! in-page query, so the read is consistent even while the page re-renders.

pub mod charts;

pub use charts::{ChartExtraction, ChartExtractor};
