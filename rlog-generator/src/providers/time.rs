//! Time-based providers.

use anyhow::{Result, bail};
use chrono::Utc;

use crate::core::expr::int_arg;
use crate::core::value::Value;
use crate::providers::{FakeContext, Registry, arg_or, check_arity};

pub fn register(registry: &mut Registry) {
    registry.register("timestamp", "func_timestamp [DAYS=30]", timestamp);
}

const SECONDS_PER_DAY: i64 = 86_400;

/// Epoch seconds drawn uniformly from the last `days` days.
fn timestamp(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 1)?;
    let days = arg_or(args, 0, 30, |raw| int_arg("days", raw))?;
    if days < 0 {
        bail!("days must be >= 0, got {days}");
    }
    let now = Utc::now().timestamp();
    let start = now - days.saturating_mul(SECONDS_PER_DAY);
    Ok(Value::Int(ctx.between(start, now)))
}
