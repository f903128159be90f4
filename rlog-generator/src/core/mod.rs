//! Pure pattern logic: values, function expressions, fields and templates.
//!
//! Nothing here touches the filesystem or the clock. Randomness comes in
//! through [`crate::providers::FakeContext`], so a seeded context yields the
//! same output on every run.

pub mod expr;
pub mod field;
pub mod template;
pub mod value;
