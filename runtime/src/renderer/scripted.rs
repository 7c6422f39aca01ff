//! In-memory render context for tests.

use super::{NavigationResult, RenderContext, Renderer};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How a scripted page behaves.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    /// Navigation error message, if loading should fail.
    pub load_error: Option<String>,
    /// Readiness answers in order; the last one repeats.
    pub readiness: Vec<bool>,
    /// Value returned by the chart query.
    pub charts: Option<serde_json::Value>,
}

impl PageScript {
    pub fn ready_with(charts: serde_json::Value) -> Self {
        Self {
            load_error: None,
            readiness: vec![true],
            charts: Some(charts),
        }
    }

    pub fn never_ready() -> Self {
        Self {
            readiness: vec![false],
            ..Default::default()
        }
    }
}

#[derive(Default)]
struct State {
    pages: HashMap<String, PageScript>,
    current: Option<String>,
    readiness_queue: VecDeque<bool>,
    last_readiness: bool,
    visited: Vec<String>,
    scripts_run: usize,
}

/// A fake page whose behaviour is keyed by URL substring.
#[derive(Clone, Default)]
pub struct ScriptedContext {
    state: Arc<Mutex<State>>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register behaviour for any URL containing `key`.
    pub fn page(self, key: &str, script: PageScript) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(key.to_string(), script);
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    pub fn scripts_run(&self) -> usize {
        self.state.lock().unwrap().scripts_run
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn current_page(state: &State) -> Option<PageScript> {
        let url = state.current.as_ref()?;
        state
            .pages
            .iter()
            .find(|(key, _)| url.contains(key.as_str()))
            .map(|(_, page)| page.clone())
    }
}

#[async_trait]
impl RenderContext for ScriptedContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        let mut state = self.state.lock().unwrap();
        state.visited.push(url.to_string());
        state.current = Some(url.to_string());
        let page = Self::current_page(&state).unwrap_or_default();
        if let Some(err) = page.load_error {
            return Err(anyhow!(err));
        }
        state.readiness_queue = page.readiness.iter().copied().collect();
        state.last_readiness = page.readiness.last().copied().unwrap_or(false);
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let mut state = self.state.lock().unwrap();
        state.scripts_run += 1;
        if script.contains("Highcharts.charts.length > 0") {
            let ready = match state.readiness_queue.pop_front() {
                Some(v) => v,
                None => state.last_readiness,
            };
            return Ok(serde_json::Value::Bool(ready));
        }
        let page = Self::current_page(&state).ok_or_else(|| anyhow!("no page loaded"))?;
        let charts = page.charts.ok_or_else(|| anyhow!("Highcharts is not defined"))?;
        Ok(serde_json::Value::String(charts.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Which step of a page never completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stall {
    Load,
    Readiness,
    Charts,
}

/// Context whose page hangs forever at one step.
#[derive(Debug, Clone, Copy)]
pub struct StalledContext {
    pub stall: Stall,
}

impl StalledContext {
    pub fn new(stall: Stall) -> Self {
        Self { stall }
    }
}

#[async_trait]
impl RenderContext for StalledContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        if self.stall == Stall::Load {
            futures::future::pending::<()>().await;
        }
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let readiness = script.contains("Highcharts.charts.length > 0");
        match self.stall {
            Stall::Readiness if readiness => futures::future::pending().await,
            Stall::Charts if !readiness => futures::future::pending().await,
            _ if readiness => Ok(serde_json::Value::Bool(true)),
            _ => Ok(serde_json::Value::String("{}".to_string())),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Renderer that hands out clones of one scripted context.
pub struct ScriptedRenderer {
    pub context: ScriptedContext,
    pub fail_launch: bool,
    shutdowns: Arc<AtomicUsize>,
}

impl ScriptedRenderer {
    pub fn new(context: ScriptedContext) -> Self {
        Self {
            context,
            fail_launch: false,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn shutdown_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.shutdowns)
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        if self.fail_launch {
            return Err(anyhow!("no chromium"));
        }
        Ok(Box::new(self.context.clone()))
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
