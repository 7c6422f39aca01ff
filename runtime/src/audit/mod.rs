//! Run auditing.

pub mod logger;

pub use logger::{PairEvent, RunLedger};
