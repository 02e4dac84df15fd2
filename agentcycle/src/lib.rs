//! Deterministic lifecycle driver for autonomous worker agents.
//!
//! Every agent cycles through Waiting, Communicating, Planning, Acting and
//! Reflecting under a finite-state machine. A periodic scheduler promotes
//! time-gated progress flags and ticks the machine; a synchronous event bus
//! carries goal arrival and completion signals between agents.
//!
//! - **[`core`]**: Pure, deterministic logic (context, states, machine, flag
//!   promotion). No I/O, fully testable in isolation.
//! - **[`io`]**: Boundaries (config files, goal payload parsing, the agent
//!   runtime startup contract).
//!
//! [`scheduler`] and [`bus`] tie the core to a clock and to other agents;
//! [`looping`], [`supervise`] and [`trace`] implement the CLI commands.

pub mod bus;
pub mod clock;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod scheduler;
pub mod supervise;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod trace;
