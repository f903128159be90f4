//! Output sinks for generated lines.
//!
//! Each output target gets exactly one [`Sink`]; patterns sharing a target share
//! the sink, and a batch is written under a single lock so batches never
//! interleave.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;

use crate::pattern::OutputTarget;

pub struct Sink {
    target: OutputTarget,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Sink {
    pub fn open(target: &OutputTarget) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match target {
            OutputTarget::Stdout => Box::new(io::stdout()),
            OutputTarget::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("create directory {}", parent.display()))?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("open output {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
        };
        debug!(output = %target, "sink opened");
        Ok(Self::from_writer(target.clone(), writer))
    }

    pub fn from_writer(target: OutputTarget, writer: Box<dyn Write + Send>) -> Self {
        Self {
            target,
            writer: Mutex::new(writer),
        }
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    /// Write every line followed by `\n`, then flush.
    pub fn write_batch(&self, lines: &[String]) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow!("sink {} lock poisoned", self.target))?;
        for line in lines {
            writer
                .write_all(line.as_bytes())
                .with_context(|| format!("write to {}", self.target))?;
            writer
                .write_all(b"\n")
                .with_context(|| format!("write to {}", self.target))?;
        }
        writer
            .flush()
            .with_context(|| format!("flush {}", self.target))?;
        Ok(())
    }
}

/// Hands out one shared sink per output target.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: Mutex<HashMap<OutputTarget, Arc<Sink>>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aliases of one file (`a.log`, `./a.log`, `logs/../a.log`, absolute)
    /// resolve to the same sink.
    pub fn get_or_open(&self, target: &OutputTarget) -> Result<Arc<Sink>> {
        let key = resolve(target)?;
        let mut sinks = self
            .sinks
            .lock()
            .map_err(|_| anyhow!("sink registry lock poisoned"))?;
        if let Some(sink) = sinks.get(&key) {
            return Ok(Arc::clone(sink));
        }
        let sink = Arc::new(Sink::open(&key)?);
        sinks.insert(key, Arc::clone(&sink));
        Ok(sink)
    }

    /// Register a pre-built sink, e.g. an in-memory writer.
    pub fn insert(&self, sink: Sink) -> Result<Arc<Sink>> {
        let key = resolve(sink.target())?;
        let mut sinks = self
            .sinks
            .lock()
            .map_err(|_| anyhow!("sink registry lock poisoned"))?;
        let sink = Arc::new(sink);
        sinks.insert(key, Arc::clone(&sink));
        Ok(sink)
    }
}

/// Absolute path with the parent directory created and canonicalized.
fn resolve(target: &OutputTarget) -> Result<OutputTarget> {
    let OutputTarget::File(path) = target else {
        return Ok(OutputTarget::Stdout);
    };
    let absolute =
        std::path::absolute(path).with_context(|| format!("resolve output {}", path.display()))?;
    let (Some(parent), Some(file_name)) = (absolute.parent(), absolute.file_name()) else {
        bail!("output {} does not name a file", path.display());
    };
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let parent = fs::canonicalize(parent)
        .with_context(|| format!("resolve directory {}", parent.display()))?;
    Ok(OutputTarget::File(parent.join(file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_appends_batches() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("logs").join("out.log");
        let target = OutputTarget::File(path.clone());

        let sink = Sink::open(&target).expect("open");
        sink.write_batch(&["one".to_string(), "two".to_string()])
            .expect("write");
        drop(sink);
        let sink = Sink::open(&target).expect("reopen");
        sink.write_batch(&["three".to_string()]).expect("write");

        let contents = fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "one\ntwo\nthree\n");
    }

    #[test]
    fn registry_shares_sinks_per_target() {
        let temp = tempfile::tempdir().expect("tempdir");
        let registry = SinkRegistry::new();
        let a = OutputTarget::File(temp.path().join("a.log"));
        let b = OutputTarget::File(temp.path().join("b.log"));

        let first = registry.get_or_open(&a).expect("open");
        let again = registry.get_or_open(&a).expect("open");
        let other = registry.get_or_open(&b).expect("open");
        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn path_aliases_share_one_sink() {
        let temp = tempfile::tempdir().expect("tempdir");
        let registry = SinkRegistry::new();
        let plain = temp.path().join("logs").join("a.log");
        let dotted = temp.path().join("logs/./other/../a.log");

        let first = registry
            .get_or_open(&OutputTarget::File(plain.clone()))
            .expect("open");
        let alias = registry
            .get_or_open(&OutputTarget::File(dotted))
            .expect("open alias");
        assert!(Arc::ptr_eq(&first, &alias));

        first.write_batch(&["one".to_string()]).expect("write");
        alias.write_batch(&["two".to_string()]).expect("write");
        assert_eq!(fs::read_to_string(&plain).expect("read"), "one\ntwo\n");
    }
}
