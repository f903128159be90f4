//! Side-effecting helpers: configuration, pattern files, output sinks, clock.

pub mod clock;
pub mod config;
pub mod pattern_store;
pub mod sink;
pub mod summary;
