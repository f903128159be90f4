//! Paced generation of a single pattern.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, trace};

use crate::io::clock::Clock;
use crate::io::sink::Sink;
use crate::pattern::{CompiledPattern, OutputTarget, RunPeriod};
use crate::providers::Registry;

/// Caps applied on top of a pattern's own `time_period`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    /// Stop after this long even if the pattern would run longer.
    pub max_duration: Option<Duration>,
    /// Stop after this many lines.
    pub max_events: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternReport {
    pub name: String,
    pub output: OutputTarget,
    pub events: u64,
    pub elapsed: Duration,
}

/// Generation stopped by an error. `events` counts the lines already written.
#[derive(Debug)]
pub struct PatternFailure {
    pub events: u64,
    pub elapsed: Duration,
    pub error: anyhow::Error,
}

impl fmt::Display for PatternFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#} (after {} events)", self.error, self.events)
    }
}

impl std::error::Error for PatternFailure {}

/// Emit `eps` lines per second until the period or a limit runs out.
///
/// Batch `k` is due at `start + k` seconds, so slow batches do not push later
/// ones back. The batch is rendered with a single timestamp and written as a
/// unit.
#[instrument(skip_all, fields(pattern = %pattern.name, eps = pattern.eps))]
pub fn run_pattern(
    pattern: &CompiledPattern,
    registry: &Registry,
    sink: &Sink,
    clock: &dyn Clock,
    limits: &RunLimits,
) -> Result<PatternReport, PatternFailure> {
    let start = clock.now();
    info!(output = %pattern.output, period = ?pattern.period, "pattern started");

    let mut events: u64 = 0;
    let outcome = emit_batches(pattern, registry, sink, clock, limits, start, &mut events);
    let elapsed = clock.now().saturating_duration_since(start);
    if let Err(error) = outcome {
        return Err(PatternFailure {
            events,
            elapsed,
            error,
        });
    }
    debug!(
        events,
        elapsed_ms = elapsed.as_millis() as u64,
        "pattern finished"
    );
    Ok(PatternReport {
        name: pattern.name.clone(),
        output: pattern.output.clone(),
        events,
        elapsed,
    })
}

/// Batch loop; `events` is kept current so a failure still reports progress.
fn emit_batches(
    pattern: &CompiledPattern,
    registry: &Registry,
    sink: &Sink,
    clock: &dyn Clock,
    limits: &RunLimits,
    start: Instant,
    events: &mut u64,
) -> Result<()> {
    let deadline = deadline(start, pattern.period, limits.max_duration);
    let mut ctx = pattern.new_context();
    let mut batch: u64 = 0;
    loop {
        let due = start + Duration::from_secs(batch);
        if deadline.is_some_and(|deadline| due >= deadline) {
            return Ok(());
        }
        let mut count = u64::from(pattern.eps);
        if let Some(max_events) = limits.max_events {
            count = count.min(max_events.saturating_sub(*events));
            if count == 0 {
                return Ok(());
            }
        }

        clock.sleep_until(due);
        let now = clock.local_now();
        let lines = (0..count)
            .map(|_| pattern.render_line(&mut ctx, registry, &now))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("render batch {batch}"))?;
        sink.write_batch(&lines)
            .with_context(|| format!("write batch {batch}"))?;
        *events += count;
        trace!(batch, events = *events, "batch written");
        batch += 1;
    }
}

fn deadline(start: Instant, period: RunPeriod, max_duration: Option<Duration>) -> Option<Instant> {
    let period = match period {
        RunPeriod::Bounded(duration) => Some(duration),
        RunPeriod::Unbounded => None,
    };
    let shortest = match (period, max_duration) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    shortest.map(|duration| start + duration)
}
