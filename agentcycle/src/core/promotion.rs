//! Time-gated flag promotion applied before each state machine tick.
//!
//! Stands in for the latency of negotiation and execution pipelines that the
//! agent does not model: once enough time has passed since the goal started,
//! the next progress flag is raised.

use std::time::Duration;

use crate::core::context::Context;

/// Elapsed-time gates, measured from the goal start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// `ready_to_plan` is raised once elapsed time exceeds this.
    pub plan_ready_after: Duration,
    /// `goal_done` is raised once elapsed time exceeds this and a plan exists.
    pub goal_done_after: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            plan_ready_after: Duration::from_millis(500),
            goal_done_after: Duration::from_millis(1000),
        }
    }
}

/// Flags newly raised by one [`promote`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Promotions {
    pub ready_to_plan: bool,
    pub goal_done: bool,
}

impl Promotions {
    pub fn any(&self) -> bool {
        self.ready_to_plan || self.goal_done
    }
}

/// Raise the flags whose gates have passed. Comparisons are strict.
pub fn promote(ctx: &mut Context, elapsed: Duration, thresholds: &Thresholds) -> Promotions {
    let mut promoted = Promotions::default();
    if ctx.has_new_goal && elapsed > thresholds.plan_ready_after && !ctx.ready_to_plan {
        ctx.ready_to_plan = true;
        promoted.ready_to_plan = true;
    }
    if ctx.plan_ready && elapsed > thresholds.goal_done_after && !ctx.goal_done {
        ctx.goal_done = true;
        promoted.goal_done = true;
    }
    promoted
}
