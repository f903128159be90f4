//! Test-only helpers: a manual clock, in-memory writers and pattern dirs.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeDelta, TimeZone};
use tempfile::TempDir;

use crate::io::clock::Clock;

/// Clock that only moves when something sleeps on it.
pub struct ManualClock {
    start: Instant,
    base: DateTime<Local>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        let base = Local
            .with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
            .earliest()
            .unwrap_or_else(Local::now);
        Self {
            start: Instant::now(),
            base,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().expect("clock lock")
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn local_now(&self) -> DateTime<Local> {
        let delta = TimeDelta::from_std(self.elapsed()).expect("offset fits");
        self.base + delta
    }

    fn sleep(&self, duration: Duration) {
        *self.offset.lock().expect("clock lock") += duration;
    }
}

/// Cloneable in-memory writer for sink tests.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().expect("buffer lock")).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("buffer lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer whose `fail_on`-th flush (1-based) errors; earlier flushes land in
/// `flushed_lines`.
#[derive(Clone)]
pub struct FlakyWriter {
    state: Arc<Mutex<FlakyState>>,
}

struct FlakyState {
    pending: Vec<u8>,
    flushed: Vec<u8>,
    flushes: usize,
    fail_on: usize,
}

impl FlakyWriter {
    pub fn failing_flush(fail_on: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(FlakyState {
                pending: Vec::new(),
                flushed: Vec::new(),
                flushes: 0,
                fail_on,
            })),
        }
    }

    pub fn flushed_lines(&self) -> Vec<String> {
        let state = self.state.lock().expect("writer lock");
        String::from_utf8_lossy(&state.flushed)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for FlakyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("writer lock poisoned"))?
            .pending
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("writer lock poisoned"))?;
        state.flushes += 1;
        if state.flushes == state.fail_on {
            state.pending.clear();
            return Err(io::Error::other("disk full"));
        }
        let pending = std::mem::take(&mut state.pending);
        state.flushed.extend_from_slice(&pending);
        Ok(())
    }
}

/// Temporary working directory with a `patterns/` folder.
pub struct PatternDir {
    temp: TempDir,
}

impl PatternDir {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        fs::create_dir_all(temp.path().join("patterns")).context("create patterns dir")?;
        Ok(Self { temp })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn patterns_dir(&self) -> PathBuf {
        self.root().join("patterns")
    }

    /// Write `patterns/<file_name>` and return its path.
    pub fn write_pattern(&self, file_name: &str, yaml: &str) -> Result<PathBuf> {
        let path = self.patterns_dir().join(file_name);
        fs::write(&path, yaml).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Minimal bounded pattern writing to `output` relative to the root.
    pub fn simple_pattern(name: &str, output: &str, eps: u32, time_period: i64) -> String {
        format!(
            "name: {name}\npath: '{output}'\neps: {eps}\ntime_period: {time_period}\n\
             template: '{name} {{seq}} {{level}}'\n\
             fields:\n  seq: func_randint 1 1000\n  level: [INFO, WARN, ERROR]\nseed: 7\n"
        )
    }
}
