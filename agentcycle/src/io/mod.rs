//! Boundaries to the outside world: config files, goal payloads, agent runtimes.

pub mod agent_runtime;
pub mod config;
pub mod goal;
