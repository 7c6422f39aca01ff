//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise `level` for this crate and
/// warnings for everything else (chromiumoxide is chatty at info).
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = format!("auction_harvest={level}")
        .parse()
        .map_err(|e| anyhow!("invalid log level {level:?}: {e}"))?;
    Ok(EnvFilter::new("warn").add_directive(directive))
}

/// Install the global subscriber. Call once, at startup.
pub fn init(level: &str, json: bool) -> Result<()> {
    let filter = env_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
