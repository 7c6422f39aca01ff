//! Page navigation with readiness detection.
//!
//! - `readiness`: the live-page predicate that says the charts have rendered.
//! - `navigator`: load, poll the predicate, settle.

pub mod navigator;
pub mod readiness;

pub use navigator::{Navigator, NavigatorConfig};
pub use readiness::ReadinessProbe;
