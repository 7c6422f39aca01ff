//! Readiness predicates evaluated against the live page.

use crate::renderer::RenderContext;

/// True once the chart library is loaded and has created at least one chart.
pub const HIGHCHARTS_READY: &str =
    "typeof Highcharts !== 'undefined' && Highcharts.charts.length > 0";

/// A script expression that evaluates to `true` when the page is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessProbe {
    script: String,
}

impl ReadinessProbe {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// Probe for rendered Highcharts instances.
    pub fn highcharts() -> Self {
        Self::new(HIGHCHARTS_READY)
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    /// Evaluate once. Script errors count as not ready.
    pub async fn check(&self, context: &dyn RenderContext) -> bool {
        match context.execute_js(&self.script).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(e) => {
                tracing::debug!("readiness probe errored: {e}");
                false
            }
        }
    }
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self::highcharts()
    }
}
