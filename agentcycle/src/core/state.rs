//! The five operating modes of an agent and their transition table.

use std::fmt;

use serde::Serialize;

use crate::core::context::Context;

/// Acting hands over to Reflecting every this many steps.
pub const REFLECT_EVERY_STEPS: u64 = 20;

/// Operating mode of an agent.
///
/// The graph is cyclic: Waiting → Communicating → Planning → Acting, with
/// Acting and Reflecting alternating until the goal completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgentState {
    Waiting,
    Communicating,
    Planning,
    Acting,
    Reflecting,
}

impl AgentState {
    pub const INITIAL: AgentState = AgentState::Waiting;

    pub fn name(self) -> &'static str {
        match self {
            AgentState::Waiting => "Waiting",
            AgentState::Communicating => "Communicating",
            AgentState::Planning => "Planning",
            AgentState::Acting => "Acting",
            AgentState::Reflecting => "Reflecting",
        }
    }

    /// Run this state's per-tick behaviour against `ctx`.
    ///
    /// Returns the state to move to, or `None` to stay. Never loops; at most
    /// one transition is requested per call.
    pub fn execute(self, ctx: &mut Context) -> Option<AgentState> {
        match self {
            AgentState::Waiting => ctx.has_new_goal.then_some(AgentState::Communicating),
            AgentState::Communicating => ctx.ready_to_plan.then_some(AgentState::Planning),
            AgentState::Planning => {
                ctx.plan_ready = true;
                Some(AgentState::Acting)
            }
            AgentState::Acting => {
                ctx.step_count += 1;
                if ctx.step_count % REFLECT_EVERY_STEPS == 0 {
                    Some(AgentState::Reflecting)
                } else if ctx.goal_done {
                    Some(AgentState::Communicating)
                } else {
                    None
                }
            }
            AgentState::Reflecting => {
                ctx.need_replan = !ctx.need_replan;
                if ctx.need_replan {
                    Some(AgentState::Planning)
                } else {
                    Some(AgentState::Acting)
                }
            }
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
