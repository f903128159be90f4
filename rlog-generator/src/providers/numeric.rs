//! Numeric providers.

use anyhow::{Result, bail};

use crate::core::expr::int_arg;
use crate::core::value::Value;
use crate::providers::{FakeContext, Registry, check_arity};

pub fn register(registry: &mut Registry) {
    registry.register("randint", "func_randint MIN MAX", randint);
}

/// Integer in `[min, max]`, both ends included.
fn randint(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 2)?;
    let [min, max] = args else {
        bail!("expected 2 arguments (min max), got {}", args.len());
    };
    let min = int_arg("min", min)?;
    let max = int_arg("max", max)?;
    if min > max {
        bail!("min {min} is greater than max {max}");
    }
    Ok(Value::Int(ctx.between(min, max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Locale;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn randint_stays_within_bounds() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(3));
        for _ in 0..200 {
            let Value::Int(n) = randint(&mut ctx, &args(&["-2", "2"])).expect("randint") else {
                panic!("randint must return an integer");
            };
            assert!((-2..=2).contains(&n));
        }
    }

    #[test]
    fn randint_accepts_equal_bounds() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(3));
        assert_eq!(
            randint(&mut ctx, &args(&["5", "5"])).expect("randint"),
            Value::Int(5)
        );
    }

    #[test]
    fn randint_rejects_inverted_or_missing_bounds() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(3));
        assert!(randint(&mut ctx, &args(&["10", "1"])).is_err());
        assert!(randint(&mut ctx, &args(&["10"])).is_err());
        assert!(randint(&mut ctx, &args(&["a", "b"])).is_err());
    }
}
