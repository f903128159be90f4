//! Stable exit codes for rlog-generator commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid configuration, pattern files or arguments.
pub const INVALID: i32 = 1;
/// `rlog-generator run` finished but at least one pattern failed.
pub const FAILED: i32 = 2;
