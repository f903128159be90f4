//! Pattern discovery and loading.
//!
//! Patterns are YAML files, one pattern per file. See `patterns/` for examples.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::pattern::PatternFile;

/// A pattern file together with where it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPattern {
    pub path: PathBuf,
    pub file: PatternFile,
}

/// Load a single pattern file.
pub fn load_pattern(path: &Path) -> Result<PatternFile> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read pattern {}", path.display()))?;
    PatternFile::parse_str(&contents).with_context(|| format!("pattern {}", path.display()))
}

/// List `*.yml` / `*.yaml` files in `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn pattern_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("read patterns dir {}", dir.display()))?;
    for entry in entries {
        let entry = entry.context("read pattern entry")?;
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yml" | "yaml")
        );
        if is_yaml && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Discover and load all patterns from a directory.
///
/// Returns patterns sorted by name. Errors on the first unreadable file or on
/// duplicate names.
pub fn discover_patterns(dir: &Path) -> Result<Vec<LoadedPattern>> {
    let mut patterns = Vec::new();
    for path in pattern_files(dir)? {
        let file = load_pattern(&path)?;
        debug!(path = %path.display(), name = %file.name, "pattern loaded");
        patterns.push(LoadedPattern { path, file });
    }
    patterns.sort_by(|left, right| left.file.name.cmp(&right.file.name));
    for pair in patterns.windows(2) {
        if pair[0].file.name == pair[1].file.name {
            return Err(anyhow!(
                "duplicate pattern name {} ({} and {})",
                pair[0].file.name,
                pair[0].path.display(),
                pair[1].path.display()
            ));
        }
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_yaml(name: &str) -> String {
        format!(
            "name: {name}\npath: '-'\neps: 1\n\
             template: 'hello {{who}}'\nfields:\n  who: [world]\n"
        )
    }

    #[test]
    fn missing_dir_is_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let found = discover_patterns(&temp.path().join("nope")).expect("discover");
        assert!(found.is_empty());
    }

    #[test]
    fn discovers_yaml_files_sorted_by_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("1.yml"), pattern_yaml("zeta")).expect("write");
        fs::write(temp.path().join("2.yaml"), pattern_yaml("alpha")).expect("write");
        fs::write(temp.path().join("notes.txt"), "ignored").expect("write");

        let found = discover_patterns(temp.path()).expect("discover");
        let names: Vec<&str> = found.iter().map(|p| p.file.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("a.yml"), pattern_yaml("same")).expect("write");
        fs::write(temp.path().join("b.yml"), pattern_yaml("same")).expect("write");
        let err = discover_patterns(temp.path()).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate pattern name same"));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("broken.yml");
        fs::write(&path, "name: [unterminated").expect("write");
        let err = load_pattern(&path).expect_err("broken");
        assert!(err.to_string().contains("broken.yml"));
    }
}
