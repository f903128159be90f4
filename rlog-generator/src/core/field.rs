//! Field value sources: a function expression or a list to choose from.

use anyhow::{Result, anyhow, bail};
use rand::seq::SliceRandom;
use serde_yaml::Value as Yaml;

use crate::core::expr::FunctionCall;
use crate::core::value::Value;
use crate::providers::{FakeContext, Registry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// `func_<name> [args...]`, evaluated through the provider registry.
    Call(FunctionCall),
    /// Uniform choice between literal values. YAML integers stay integers.
    Choice(Vec<Value>),
}

impl FieldSpec {
    pub fn from_yaml(raw: &Yaml) -> Result<Self> {
        match raw {
            Yaml::String(expr) => Ok(FieldSpec::Call(FunctionCall::parse(expr)?)),
            Yaml::Sequence(items) => {
                if items.is_empty() {
                    bail!("choice list must be non-empty");
                }
                let choices = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        scalar_value(item)
                            .ok_or_else(|| anyhow!("choice [{index}] must be a scalar"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(FieldSpec::Choice(choices))
            }
            _ => bail!("field value can be a string or a list"),
        }
    }

    /// Fail early when the expression names a provider the registry lacks.
    pub fn check(&self, registry: &Registry) -> Result<()> {
        if let FieldSpec::Call(call) = self
            && !registry.contains(&call.name)
        {
            bail!("function {} not found", call.name);
        }
        Ok(())
    }

    pub fn draw(&self, ctx: &mut FakeContext, registry: &Registry) -> Result<Value> {
        match self {
            FieldSpec::Call(call) => registry.call(ctx, call),
            FieldSpec::Choice(choices) => choices
                .choose(ctx.rng())
                .cloned()
                .ok_or_else(|| anyhow!("choice list must be non-empty")),
        }
    }
}

fn scalar_value(item: &Yaml) -> Option<Value> {
    match item {
        Yaml::String(s) => Some(Value::Str(s.clone())),
        Yaml::Number(n) => Some(match n.as_i64() {
            Some(int) => Value::Int(int),
            None => Value::Str(n.to_string()),
        }),
        Yaml::Bool(b) => Some(Value::from(if *b { "True" } else { "False" })),
        _ => None,
    }
}
