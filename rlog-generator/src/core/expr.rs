//! Function expressions such as `func_randint 1 10`.

use anyhow::{Result, anyhow, bail};

/// Prefix every function token must carry.
pub const FUNC_PREFIX: &str = "func_";

/// A parsed function expression: provider name plus raw string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<String>,
}

impl FunctionCall {
    /// Parse a whitespace-separated expression.
    ///
    /// The first token names the provider (`func_<name>`); remaining tokens are
    /// passed through untouched and converted by the provider itself.
    pub fn parse(input: &str) -> Result<Self> {
        let mut tokens = input.split_whitespace();
        let head = tokens
            .next()
            .ok_or_else(|| anyhow!("function expression must be non-empty"))?;
        let Some(name) = head.strip_prefix(FUNC_PREFIX) else {
            bail!("function expression {input:?} must start with `{FUNC_PREFIX}`");
        };
        if name.is_empty() {
            bail!("function expression {input:?} is missing a function name");
        }
        Ok(Self {
            name: name.to_string(),
            args: tokens.map(str::to_string).collect(),
        })
    }
}

/// Parse an integer argument, naming the argument in the error.
pub fn int_arg(label: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| anyhow!("argument {label} must be an integer, got {raw:?}"))
}

/// Parse a count argument that must fall within `min..=max`.
pub fn count_arg(label: &str, raw: &str, min: usize, max: usize) -> Result<usize> {
    let n = int_arg(label, raw)?;
    match usize::try_from(n) {
        Ok(count) if (min..=max).contains(&count) => Ok(count),
        _ => bail!("argument {label} must be between {min} and {max}, got {n}"),
    }
}

/// Parse a boolean argument (`true/false`, `yes/no`, `1/0`).
pub fn bool_arg(label: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(anyhow!("argument {label} must be a boolean, got {raw:?}")),
    }
}
