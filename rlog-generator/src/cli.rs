//! CLI command implementations.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Local;
use tracing::{debug, info, warn};

use crate::generate::RunLimits;
use crate::io::clock::SystemClock;
use crate::io::config::{DEFAULT_CONFIG_FILE, GeneratorConfig, load_config, write_config};
use crate::io::pattern_store::{discover_patterns, load_pattern, pattern_files};
use crate::io::sink::SinkRegistry;
use crate::io::summary::{RunSummary, write_summary};
use crate::pattern::CompiledPattern;
use crate::pool::{RunOptions, run_patterns};
use crate::providers::Registry;

const EXAMPLE_PATTERN: &str = include_str!("../patterns/apache_access.yml");

/// Flags that override values from the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub patterns_dir: Option<PathBuf>,
    pub max_concurrency: Option<usize>,
}

/// Load the config file and apply command-line overrides.
///
/// An explicitly requested config file must exist; the default `rlog.toml` may
/// be absent.
pub fn resolve_config(
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> Result<GeneratorConfig> {
    let mut cfg = match config_path {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} not found", path.display());
            }
            load_config(path)?
        }
        None => load_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(dir) = &overrides.patterns_dir {
        cfg.patterns_dir = dir.clone();
    }
    if let Some(max_concurrency) = overrides.max_concurrency {
        cfg.max_concurrency = max_concurrency;
    }
    cfg.validate()?;
    debug!(?cfg, "config resolved");
    Ok(cfg)
}

/// Create `rlog.toml` and an example pattern under `root` if missing.
pub fn init_workspace(root: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let cfg = GeneratorConfig::default();
    let config_path = root.join(DEFAULT_CONFIG_FILE);
    if force || !config_path.exists() {
        write_config(&config_path, &cfg)?;
        written.push(config_path);
    }
    let patterns_dir = root.join(&cfg.patterns_dir);
    std::fs::create_dir_all(&patterns_dir)
        .with_context(|| format!("create {}", patterns_dir.display()))?;
    let example = patterns_dir.join("apache_access.yml");
    if force || !example.exists() {
        std::fs::write(&example, EXAMPLE_PATTERN)
            .with_context(|| format!("write {}", example.display()))?;
        written.push(example);
    }
    Ok(written)
}

/// Print one line per pattern: name, enabled flag, eps and output.
pub fn list_patterns(cfg: &GeneratorConfig, out: &mut dyn Write) -> Result<()> {
    for loaded in discover_patterns(&cfg.patterns_dir)? {
        let file = &loaded.file;
        writeln!(
            out,
            "{}\tenabled={}\teps={}\tpath={}",
            file.name, file.enabled, file.eps, file.path
        )?;
    }
    Ok(())
}

/// Load and compile every pattern file, reporting all problems at once.
pub fn validate_patterns(
    cfg: &GeneratorConfig,
    registry: &Registry,
    out: &mut dyn Write,
) -> Result<()> {
    let locale = cfg.locale()?;
    let paths = pattern_files(&cfg.patterns_dir)?;
    if paths.is_empty() {
        bail!("no pattern files found in {}", cfg.patterns_dir.display());
    }

    let mut seen: Vec<(String, PathBuf)> = Vec::new();
    let mut invalid = 0usize;
    for path in &paths {
        let result = load_pattern(path).and_then(|file| {
            file.compile(locale, registry)
                .with_context(|| format!("pattern {}", path.display()))
        });
        match result {
            Ok(pattern) => {
                if let Some((_, first)) = seen.iter().find(|(name, _)| *name == pattern.name) {
                    invalid += 1;
                    writeln!(
                        out,
                        "error: {}: duplicate pattern name {} (also in {})",
                        path.display(),
                        pattern.name,
                        first.display()
                    )?;
                    continue;
                }
                writeln!(out, "ok: {} ({})", pattern.name, path.display())?;
                seen.push((pattern.name, path.clone()));
            }
            Err(err) => {
                invalid += 1;
                writeln!(out, "error: {err:#}")?;
            }
        }
    }
    if invalid > 0 {
        bail!("{invalid} of {} pattern file(s) invalid", paths.len());
    }
    Ok(())
}

/// Compile patterns from the configured directory, optionally keeping only `only`.
pub fn compile_patterns(
    cfg: &GeneratorConfig,
    registry: &Registry,
    only: &[String],
) -> Result<Vec<CompiledPattern>> {
    let locale = cfg.locale()?;
    let loaded = discover_patterns(&cfg.patterns_dir)?;
    for name in only {
        if !loaded.iter().any(|pattern| &pattern.file.name == name) {
            bail!("pattern {name} not found in {}", cfg.patterns_dir.display());
        }
    }
    loaded
        .iter()
        .filter(|pattern| only.is_empty() || only.contains(&pattern.file.name))
        .map(|pattern| {
            pattern
                .file
                .compile(locale, registry)
                .with_context(|| format!("pattern {}", pattern.path.display()))
        })
        .collect()
}

/// Render `count` lines of one pattern to `out` without pacing.
pub fn sample_pattern(
    cfg: &GeneratorConfig,
    registry: &Registry,
    name: &str,
    count: u64,
    out: &mut dyn Write,
) -> Result<()> {
    let patterns = compile_patterns(cfg, registry, &[name.to_string()])?;
    let Some(pattern) = patterns.first() else {
        bail!("pattern {name} not found");
    };
    let mut ctx = pattern.new_context();
    for _ in 0..count {
        let line = pattern.render_line(&mut ctx, registry, &Local::now())?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Parameters of `rlog-generator run`.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub only: Vec<String>,
    pub duration: Option<Duration>,
    pub summary_path: Option<PathBuf>,
}

/// Run all selected patterns to completion.
pub fn run_generator(
    cfg: &GeneratorConfig,
    registry: &Registry,
    request: &RunRequest,
) -> Result<RunSummary> {
    let patterns = compile_patterns(cfg, registry, &request.only)?;
    if !patterns.iter().any(|pattern| pattern.enabled) {
        bail!("no enabled patterns in {}", cfg.patterns_dir.display());
    }
    info!(patterns = patterns.len(), "patterns compiled");

    let options = RunOptions {
        max_concurrency: cfg.max_concurrency,
        limits: RunLimits {
            max_duration: request.duration,
            max_events: None,
        },
    };
    let summary = run_patterns(
        &patterns,
        registry,
        &SinkRegistry::new(),
        &SystemClock,
        &options,
    )?;

    if let Some(path) = &request.summary_path {
        write_summary(path, &summary).context("write run summary")?;
    }
    for failed in summary.failed() {
        warn!(pattern = %failed.name, "pattern did not complete");
    }
    eprintln!(
        "run: patterns={} events={} failed={}",
        summary.patterns.len(),
        summary.total_events,
        summary.failed().count()
    );
    Ok(summary)
}

/// Print every provider with its usage line.
pub fn list_providers(registry: &Registry, out: &mut dyn Write) -> Result<()> {
    for (name, usage) in registry.describe() {
        writeln!(out, "{name}\t{usage}")?;
    }
    Ok(())
}
