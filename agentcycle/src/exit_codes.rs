//! Stable exit codes for agentcycle CLI commands.

/// Command succeeded (for `run`: a goal completed).
pub const OK: i32 = 0;
/// Invalid config, goal payload or arguments, or any other error.
pub const INVALID: i32 = 1;
/// An agent runtime failed to start.
pub const STARTUP_FAILED: i32 = 2;
/// `agentcycle run` was interrupted before any goal completed.
pub const INTERRUPTED: i32 = 3;
