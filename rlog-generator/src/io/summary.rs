//! Run summary persisted as JSON after `rlog-generator run --summary`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatternStatus {
    Completed,
    Failed,
}

/// Outcome of one pattern within a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternSummary {
    pub name: String,
    /// Output the pattern wrote to, as given in its `path`.
    pub path: String,
    pub events: u64,
    pub status: PatternStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Outcome of a whole run, patterns listed in the order they were scheduled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub started_at: String,
    pub finished_at: String,
    pub total_events: u64,
    pub patterns: Vec<PatternSummary>,
}

impl RunSummary {
    pub fn failed(&self) -> impl Iterator<Item = &PatternSummary> {
        self.patterns
            .iter()
            .filter(|pattern| pattern.status == PatternStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}

/// Serialize the summary to pretty-printed JSON with trailing newline.
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut payload = serde_json::to_string_pretty(summary).context("serialize summary json")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            started_at: "2024-01-01T00:00:00+00:00".to_string(),
            finished_at: "2024-01-01T00:00:05+00:00".to_string(),
            total_events: 10,
            patterns: vec![
                PatternSummary {
                    name: "ok".to_string(),
                    path: "stdout".to_string(),
                    events: 10,
                    status: PatternStatus::Completed,
                    error: None,
                    duration_ms: 5_000,
                },
                PatternSummary {
                    name: "broken".to_string(),
                    path: "/nope/out.log".to_string(),
                    events: 0,
                    status: PatternStatus::Failed,
                    error: Some("open output".to_string()),
                    duration_ms: 0,
                },
            ],
        }
    }

    #[test]
    fn reports_failures() {
        let summary = summary();
        assert!(summary.has_failures());
        let failed: Vec<&str> = summary.failed().map(|p| p.name.as_str()).collect();
        assert_eq!(failed, vec!["broken"]);
    }

    #[test]
    fn writes_json_with_snake_case_status() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("out").join("summary.json");
        write_summary(&path, &summary()).expect("write");

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["patterns"][1]["status"], "failed");
        assert_eq!(value["patterns"][1]["path"], "/nope/out.log");
        assert!(value["patterns"][1].get("output").is_none());
        assert!(value["patterns"][0].get("error").is_none());
    }
}
