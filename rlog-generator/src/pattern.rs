//! Pattern definitions: the YAML shape and its validated, compiled form.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;

use crate::core::field::FieldSpec;
use crate::core::template::Template;
use crate::core::value::Value;
use crate::providers::{FakeContext, Locale, Registry};

/// Raw pattern file as written by users.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PatternFile {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Output file; `-` or `stdout` writes to standard output.
    pub path: String,
    /// Events per second.
    pub eps: u32,
    /// Seconds to run; negative runs until interrupted.
    #[serde(default = "default_time_period")]
    pub time_period: i64,
    pub template: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_time_period() -> i64 {
    60
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    fn parse(raw: &str) -> Self {
        match raw.trim() {
            "-" | "stdout" => OutputTarget::Stdout,
            path => OutputTarget::File(PathBuf::from(path)),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => f.write_str("stdout"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPeriod {
    Bounded(Duration),
    Unbounded,
}

/// A pattern that passed validation and is ready to generate lines.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub name: String,
    pub enabled: bool,
    pub output: OutputTarget,
    pub eps: u32,
    pub period: RunPeriod,
    pub locale: Locale,
    pub seed: Option<u64>,
    template: Template,
    fields: BTreeMap<String, FieldSpec>,
}

impl PatternFile {
    pub fn parse_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("parse pattern yaml")
    }

    pub fn compile(&self, default_locale: Locale, registry: &Registry) -> Result<CompiledPattern> {
        validate_name(&self.name)?;
        if self.path.trim().is_empty() {
            bail!("path must be non-empty");
        }
        if self.eps == 0 {
            bail!("eps must be > 0");
        }
        let period = match self.time_period {
            0 => bail!("time_period must be non-zero (negative runs forever)"),
            secs if secs < 0 => RunPeriod::Unbounded,
            secs => RunPeriod::Bounded(Duration::from_secs(secs.unsigned_abs())),
        };
        let locale = match &self.locale {
            Some(raw) => raw.parse::<Locale>().context("locale")?,
            None => default_locale,
        };

        let template = Template::parse(&self.template).context("template")?;
        let mut fields = BTreeMap::new();
        for (name, raw) in &self.fields {
            let spec = FieldSpec::from_yaml(raw).with_context(|| format!("fields.{name}"))?;
            spec.check(registry)
                .with_context(|| format!("fields.{name}"))?;
            fields.insert(name.clone(), spec);
        }
        for name in template.field_names() {
            if !fields.contains_key(name) {
                bail!("template references field {name:?} which is not defined in fields");
            }
        }

        let compiled = CompiledPattern {
            name: self.name.clone(),
            enabled: self.enabled,
            output: OutputTarget::parse(&self.path),
            eps: self.eps,
            period,
            locale,
            seed: self.seed,
            template,
            fields,
        };
        // A trial line surfaces bad provider arguments and spec/type mismatches.
        let mut trial = FakeContext::new(locale, Some(0));
        compiled
            .render_line(&mut trial, registry, &Local::now())
            .context("trial render")?;
        Ok(compiled)
    }
}

impl CompiledPattern {
    pub fn new_context(&self) -> FakeContext {
        FakeContext::new(self.locale, self.seed)
    }

    /// Draw every field once, in name order, and render the template.
    pub fn render_line<Tz>(
        &self,
        ctx: &mut FakeContext,
        registry: &Registry,
        now: &DateTime<Tz>,
    ) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut values: BTreeMap<String, Value> = BTreeMap::new();
        for (name, spec) in &self.fields {
            let value = spec
                .draw(ctx, registry)
                .with_context(|| format!("field {name}"))?;
            values.insert(name.clone(), value);
        }
        self.template.render(now, &values)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("name must be non-empty");
    }
    if !name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
    {
        bail!("name {name:?} must use [A-Za-z0-9_.-] only");
    }
    if name.contains("..") {
        bail!("name must not contain '..'");
    }
    Ok(())
}
