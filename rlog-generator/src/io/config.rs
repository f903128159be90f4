//! Generator configuration stored in `rlog.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::providers::Locale;

pub const DEFAULT_CONFIG_FILE: &str = "rlog.toml";

/// Generator configuration (TOML).
///
/// Every key is optional; command-line flags override whatever is loaded here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory scanned for `*.yml` / `*.yaml` pattern files.
    pub patterns_dir: PathBuf,

    /// Upper bound on patterns generating at the same time.
    pub max_concurrency: usize,

    /// Locale for patterns that do not set one.
    pub default_locale: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            patterns_dir: PathBuf::from("patterns"),
            max_concurrency: 10,
            default_locale: Locale::default().to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.patterns_dir.as_os_str().is_empty() {
            return Err(anyhow!("patterns_dir must be non-empty"));
        }
        if self.max_concurrency == 0 {
            return Err(anyhow!("max_concurrency must be > 0"));
        }
        self.locale()?;
        Ok(())
    }

    pub fn locale(&self) -> Result<Locale> {
        self.default_locale
            .parse::<Locale>()
            .context("default_locale")
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GeneratorConfig::default()`.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    if !path.exists() {
        return Ok(GeneratorConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GeneratorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &GeneratorConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, GeneratorConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("rlog.toml");
        let cfg = GeneratorConfig {
            max_concurrency: 3,
            default_locale: "it_IT".to_string(),
            ..GeneratorConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.locale().expect("locale"), Locale::ItIt);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("rlog.toml");
        fs::write(&path, "max_concurrency = 2\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.max_concurrency, 2);
        assert_eq!(cfg.patterns_dir, PathBuf::from("patterns"));
    }

    #[test]
    fn rejects_zero_concurrency_and_bad_locale() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("rlog.toml");
        fs::write(&path, "max_concurrency = 0\n").expect("write");
        assert!(load_config(&path).is_err());
        fs::write(&path, "default_locale = \"xx\"\n").expect("write");
        assert!(load_config(&path).is_err());
    }
}
