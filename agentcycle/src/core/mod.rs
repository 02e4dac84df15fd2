//! Deterministic, pure logic for the agent lifecycle.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod context;
pub mod machine;
pub mod promotion;
pub mod state;
pub mod types;
