//! Runs many patterns concurrently on a bounded set of worker threads.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{debug, error, info};

use crate::generate::{PatternFailure, RunLimits, run_pattern};
use crate::io::clock::Clock;
use crate::io::sink::SinkRegistry;
use crate::io::summary::{PatternStatus, PatternSummary, RunSummary};
use crate::pattern::CompiledPattern;
use crate::providers::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub max_concurrency: usize,
    pub limits: RunLimits,
}

/// Run every enabled pattern, at most `max_concurrency` at a time.
///
/// A failing pattern is recorded in the summary; the others keep running.
pub fn run_patterns(
    patterns: &[CompiledPattern],
    registry: &Registry,
    sinks: &SinkRegistry,
    clock: &dyn Clock,
    options: &RunOptions,
) -> Result<RunSummary> {
    if options.max_concurrency == 0 {
        bail!("max_concurrency must be > 0");
    }
    let jobs: VecDeque<(usize, &CompiledPattern)> = patterns
        .iter()
        .filter(|pattern| {
            if !pattern.enabled {
                debug!(pattern = %pattern.name, "skipping disabled pattern");
            }
            pattern.enabled
        })
        .enumerate()
        .collect();
    let job_count = jobs.len();
    let workers = options.max_concurrency.min(job_count);
    info!(patterns = job_count, workers, "run started");

    let started_at = Utc::now();
    let queue = Mutex::new(jobs);
    let results: Mutex<Vec<Option<PatternSummary>>> = Mutex::new(vec![None; job_count]);

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                while let Some((slot, pattern)) = next_job(&queue) {
                    let summary = run_one(pattern, registry, sinks, clock, &options.limits);
                    if let Ok(mut results) = results.lock() {
                        results[slot] = Some(summary);
                    }
                }
            });
        }
    });

    let patterns: Vec<PatternSummary> = results
        .into_inner()
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect();
    let total_events = patterns.iter().map(|pattern| pattern.events).sum();
    let summary = RunSummary {
        started_at: started_at.to_rfc3339(),
        finished_at: Utc::now().to_rfc3339(),
        total_events,
        patterns,
    };
    info!(
        total_events,
        failed = summary.failed().count(),
        "run finished"
    );
    Ok(summary)
}

fn next_job<'a>(
    queue: &Mutex<VecDeque<(usize, &'a CompiledPattern)>>,
) -> Option<(usize, &'a CompiledPattern)> {
    queue.lock().ok()?.pop_front()
}

fn run_one(
    pattern: &CompiledPattern,
    registry: &Registry,
    sinks: &SinkRegistry,
    clock: &dyn Clock,
    limits: &RunLimits,
) -> PatternSummary {
    let started = clock.now();
    let outcome = match sinks.get_or_open(&pattern.output) {
        Ok(sink) => run_pattern(pattern, registry, &sink, clock, limits),
        Err(error) => Err(PatternFailure {
            events: 0,
            elapsed: Duration::ZERO,
            error,
        }),
    };
    let duration_ms = clock.now().saturating_duration_since(started).as_millis() as u64;
    match outcome {
        Ok(report) => PatternSummary {
            name: report.name,
            path: report.output.to_string(),
            events: report.events,
            status: PatternStatus::Completed,
            error: None,
            duration_ms,
        },
        Err(failure) => {
            let message = format!("{:#}", failure.error);
            error!(
                pattern = %pattern.name,
                events = failure.events,
                err = %message,
                "pattern failed"
            );
            PatternSummary {
                name: pattern.name.clone(),
                path: pattern.output.to_string(),
                events: failure.events,
                status: PatternStatus::Failed,
                error: Some(message),
                duration_ms,
            }
        }
    }
}
