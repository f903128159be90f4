//! Diagnostic tracing for the generator itself.
//!
//! Generated log lines never pass through here; they go straight to their sinks.
//! Diagnostics go to stderr so they never mix with lines written to stdout.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Filter precedence: explicit `level` (from `--log-level`), then `RUST_LOG`,
/// then `warn`.
///
/// # Example
/// ```bash
/// RUST_LOG=rlog_generator=debug rlog-generator run
/// ```
pub fn init(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .context("initialize tracing")?;
    Ok(())
}
