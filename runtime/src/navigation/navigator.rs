//! Drive the page to a URL and wait until its charts are ready.

use super::readiness::ReadinessProbe;
use crate::error::NavigationFailure;
use crate::renderer::{NavigationResult, RenderContext};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Timing knobs for a single navigation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigatorConfig {
    /// Bound on the page load, and separately on readiness polling.
    pub timeout: Duration,
    /// Fixed wait after readiness so labels and animations finish.
    pub settle_delay: Duration,
    /// Delay between readiness checks.
    pub poll_interval: Duration,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(3),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Loads pages and blocks until a readiness probe passes.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    config: NavigatorConfig,
}

impl Navigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Navigate and wait, reporting success as a flag.
    ///
    /// Never fails: every error is logged as a warning and becomes `false`.
    pub async fn navigate(
        &self,
        context: &mut dyn RenderContext,
        url: &str,
        probe: &ReadinessProbe,
    ) -> bool {
        match self.try_navigate(context, url, probe).await {
            Ok(_) => true,
            Err(e) => {
                warn!("navigation error: {e}");
                false
            }
        }
    }

    /// Navigate and wait, keeping the failure cause.
    pub async fn try_navigate(
        &self,
        context: &mut dyn RenderContext,
        url: &str,
        probe: &ReadinessProbe,
    ) -> Result<NavigationResult, NavigationFailure> {
        let timeout = self.config.timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let nav = match tokio::time::timeout(timeout, context.navigate(url, timeout_ms)).await {
            Ok(Ok(nav)) => nav,
            Ok(Err(e)) => {
                return Err(NavigationFailure::Load {
                    url: url.to_string(),
                    reason: format!("{e:#}"),
                })
            }
            Err(_) => {
                return Err(NavigationFailure::LoadTimeout {
                    url: url.to_string(),
                    timeout,
                })
            }
        };
        debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);

        self.wait_until_ready(&*context, url, probe).await?;

        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }
        Ok(nav)
    }

    async fn wait_until_ready(
        &self,
        context: &dyn RenderContext,
        url: &str,
        probe: &ReadinessProbe,
    ) -> Result<(), NavigationFailure> {
        let deadline = Instant::now() + self.config.timeout;
        let mut polls = 0u32;

        let timed_out = || NavigationFailure::ReadinessTimeout {
            url: url.to_string(),
            timeout: self.config.timeout,
        };

        loop {
            polls += 1;
            // A hung page script must not outlive the deadline.
            let ready = tokio::time::timeout_at(deadline, probe.check(context))
                .await
                .map_err(|_| timed_out())?;
            if ready {
                debug!("{url} ready after {polls} poll(s)");
                return Ok(());
            }
            if Instant::now() + self.config.poll_interval > deadline {
                return Err(timed_out());
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::scripted::{PageScript, ScriptedContext, Stall, StalledContext};

    fn fast() -> Navigator {
        Navigator::new(NavigatorConfig {
            timeout: Duration::from_millis(60),
            settle_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(5),
        })
    }

    #[tokio::test]
    async fn test_navigate_ready_page() {
        let mut ctx =
            ScriptedContext::new().page("symbol=A", PageScript::ready_with(serde_json::json!({})));
        let ok = fast()
            .navigate(&mut ctx, "https://x/nyse-auction-data?symbol=A", &ReadinessProbe::highcharts())
            .await;
        assert!(ok);
    }

    #[tokio::test]
    async fn test_navigate_polls_until_ready() {
        let script = PageScript {
            readiness: vec![false, false, true],
            charts: Some(serde_json::json!({})),
            ..Default::default()
        };
        let mut ctx = ScriptedContext::new().page("slow", script);
        let nav = fast()
            .try_navigate(&mut ctx, "https://x/slow", &ReadinessProbe::highcharts())
            .await
            .unwrap();
        assert_eq!(nav.final_url, "https://x/slow");
        assert_eq!(ctx.scripts_run(), 3);
    }

    #[tokio::test]
    async fn test_readiness_timeout() {
        let mut ctx = ScriptedContext::new().page("never", PageScript::never_ready());
        let err = fast()
            .try_navigate(&mut ctx, "https://x/never", &ReadinessProbe::highcharts())
            .await
            .unwrap_err();
        assert!(matches!(err, NavigationFailure::ReadinessTimeout { .. }));

        assert!(
            !fast()
                .navigate(&mut ctx, "https://x/never", &ReadinessProbe::highcharts())
                .await
        );
    }

    #[tokio::test]
    async fn test_load_error_is_reported() {
        let script = PageScript {
            load_error: Some("net::ERR_NAME_NOT_RESOLVED".to_string()),
            ..Default::default()
        };
        let mut ctx = ScriptedContext::new().page("broken", script);
        let err = fast()
            .try_navigate(&mut ctx, "https://x/broken", &ReadinessProbe::highcharts())
            .await
            .unwrap_err();
        match err {
            NavigationFailure::Load { reason, .. } => {
                assert!(reason.contains("ERR_NAME_NOT_RESOLVED"))
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_readiness_query_is_bounded() {
        let mut ctx = StalledContext::new(Stall::Readiness);
        let started = Instant::now();
        let err = fast()
            .try_navigate(&mut ctx, "https://x/hung", &ReadinessProbe::highcharts())
            .await
            .unwrap_err();
        assert!(matches!(err, NavigationFailure::ReadinessTimeout { .. }));
        assert!(started.elapsed() <= Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_load_times_out() {
        let mut ctx = StalledContext::new(Stall::Load);
        let err = fast()
            .try_navigate(&mut ctx, "https://x/stuck", &ReadinessProbe::highcharts())
            .await
            .unwrap_err();
        match err {
            NavigationFailure::LoadTimeout { url, timeout } => {
                assert_eq!(url, "https://x/stuck");
                assert_eq!(timeout, Duration::from_millis(60));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_follows_readiness_only() {
        let navigator = Navigator::new(NavigatorConfig {
            settle_delay: Duration::from_secs(3),
            ..fast().config
        });
        let probe = ReadinessProbe::highcharts();
        let mut ctx = ScriptedContext::new()
            .page("ready", PageScript::ready_with(serde_json::json!({})))
            .page("never", PageScript::never_ready());

        let started = Instant::now();
        navigator
            .try_navigate(&mut ctx, "https://x/ready", &probe)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));

        let started = Instant::now();
        navigator
            .try_navigate(&mut ctx, "https://x/never", &probe)
            .await
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
