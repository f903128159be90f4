//! Fake-data providers callable from patterns as `func_<name>`.
//!
//! Providers are plain functions over a [`FakeContext`]. The [`Registry`] maps
//! names to providers; [`Registry::builtin`] carries everything shipped with the
//! crate and [`Registry::register`] lets library users add their own.

pub mod internet;
pub mod locale;
pub mod network;
pub mod numeric;
pub mod text;
pub mod time;

use std::collections::BTreeMap;

use anyhow::{Result, anyhow, bail};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::core::expr::FunctionCall;
use crate::core::value::Value;

pub use locale::Locale;

/// Signature shared by every provider.
pub type ProviderFn = fn(&mut FakeContext, &[String]) -> Result<Value>;

/// Random source plus locale for one pattern stream.
pub struct FakeContext {
    rng: StdRng,
    locale: Locale,
}

impl FakeContext {
    /// Seeded contexts produce identical sequences across runs.
    pub fn new(locale: Locale, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Uniform pick from a non-empty word list.
    pub fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// Inclusive integer range; callers validate `low <= high`.
    pub fn between(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }
}

struct Entry {
    func: ProviderFn,
    usage: &'static str,
}

/// Name-to-provider table.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        numeric::register(&mut registry);
        network::register(&mut registry);
        internet::register(&mut registry);
        text::register(&mut registry);
        time::register(&mut registry);
        registry
    }

    /// Add or replace a provider.
    pub fn register(&mut self, name: &str, usage: &'static str, func: ProviderFn) {
        self.entries.insert(name.to_string(), Entry { func, usage });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// `(name, usage)` pairs sorted by name.
    pub fn describe(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.usage))
    }

    pub fn call(&self, ctx: &mut FakeContext, call: &FunctionCall) -> Result<Value> {
        let entry = self
            .entries
            .get(&call.name)
            .ok_or_else(|| anyhow!("function {} not found", call.name))?;
        (entry.func)(ctx, &call.args).map_err(|err| anyhow!("func_{}: {err}", call.name))
    }
}

/// Fail when a provider receives more than `max` arguments.
pub(crate) fn check_arity(args: &[String], max: usize) -> Result<()> {
    if args.len() > max {
        bail!("expected at most {max} argument(s), got {}", args.len());
    }
    Ok(())
}

/// Parse the optional positional argument at `index`, or fall back to `default`.
pub(crate) fn arg_or<T>(
    args: &[String],
    index: usize,
    default: T,
    parse: impl FnOnce(&str) -> Result<T>,
) -> Result<T> {
    match args.get(index) {
        Some(raw) => parse(raw),
        None => Ok(default),
    }
}
