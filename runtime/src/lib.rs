//! Auction Harvest: browser-driven extraction of NYSE auction imbalance charts.
//!
//! A run expands a date range into business days, loads the auction data page
//! for every (symbol, date) pair in a single Chromium tab, pulls the opening
//! and closing chart series out of the live page, and flattens them into one
//! CSV.

pub mod audit;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod harvest;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod normalize;
pub mod renderer;
pub mod site;
