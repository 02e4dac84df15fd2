//! Per-agent mutable progress record.

use std::time::Instant;

use crate::core::types::{GoalId, GoalPayload, Inventory};

/// Goal and progress flags shared by every state and the scheduler.
///
/// One instance lives for the whole agent session and is mutated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// Active goal, set only when a goal arrives.
    pub goal_id: Option<GoalId>,
    pub has_new_goal: bool,
    pub ready_to_plan: bool,
    pub plan_ready: bool,
    pub goal_done: bool,
    pub need_replan: bool,
    /// Acting ticks since the last goal reset.
    pub step_count: u64,
    /// Owned copy of the initiating goal's inventory.
    pub inventory: Inventory,
    /// Instant of the most recent goal reset.
    pub goal_start_time: Option<Instant>,
}

impl Context {
    /// Context with every flag cleared and no goal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a context from an initial goal payload.
    ///
    /// `has_new_goal` is set even when `goal` is `None`.
    pub fn from_goal(goal: Option<&GoalPayload>) -> Self {
        let mut ctx = Self::new();
        if let Some(goal) = goal {
            ctx.goal_id = goal.goal_id.clone();
            if let Some(inventory) = &goal.inventory {
                ctx.inventory = inventory.clone();
            }
        }
        ctx.has_new_goal = true;
        ctx
    }

    /// Apply a goal arrival: restart the progress flags and the goal clock.
    ///
    /// `need_replan` is left alone; goal id and inventory are replaced only
    /// when the payload carries them.
    pub fn reset_for_goal(&mut self, goal: &GoalPayload, now: Instant) {
        if let Some(goal_id) = &goal.goal_id {
            self.goal_id = Some(goal_id.clone());
        }
        if let Some(inventory) = &goal.inventory {
            self.inventory = inventory.clone();
        }
        self.has_new_goal = true;
        self.ready_to_plan = false;
        self.plan_ready = false;
        self.goal_done = false;
        self.step_count = 0;
        self.goal_start_time = Some(now);
    }
}
