//! Random log generator driven by YAML patterns.
//!
//! A pattern pairs a `str.format`-style template with fields whose values are
//! drawn at random, either from a list or from a fake-data provider
//! (`func_randippub`, `func_randusername`, ...). Patterns emit a fixed number of
//! events per second for a time period.
//!
//! - **[`core`]**: templates, fields and function expressions. No I/O.
//! - **[`providers`]**: the fake-data functions and their registry.
//! - **[`io`]**: configuration, pattern files, output sinks and the clock.
//!
//! [`generate`] paces a single pattern; [`pool`] runs many of them on worker
//! threads. [`cli`] implements the command-line surface.

pub mod cli;
pub mod core;
pub mod exit_codes;
pub mod generate;
pub mod io;
pub mod logging;
pub mod pattern;
pub mod pool;
pub mod providers;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
