//! Deterministic simulation for `agentcycle trace`.
//!
//! Drives a single agent on a [`ManualClock`], advancing one tick period per
//! tick, so the full lifecycle can be inspected without waiting.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::bus::EventBus;
use crate::clock::{Clock, ManualClock};
use crate::core::context::Context;
use crate::core::state::AgentState;
use crate::core::types::GoalPayload;
use crate::io::config::AppConfig;
use crate::scheduler::{Agent, TickOutcome};
use crate::supervise::sample_goal;

/// State of the agent after one simulated tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceLine {
    pub tick: u64,
    pub elapsed_ms: u64,
    pub state: AgentState,
    pub changed: bool,
    pub step_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOutcome {
    pub agent: String,
    pub lines: Vec<TraceLine>,
    /// Tick at which goal completion was first announced.
    pub completed_at: Option<u64>,
    /// Whether the sample goal was published during the trace.
    pub sample_goal_published: bool,
}

/// Simulate up to `max_ticks` ticks of the first configured agent.
///
/// Tick `n` runs at `n * tick_period`. Without `goal`, the sample goal is
/// published before the first tick at or past `goal_delay_ms`.
pub fn run_trace(cfg: &AppConfig, goal: Option<&GoalPayload>, max_ticks: u64) -> Result<TraceOutcome> {
    cfg.validate()?;
    let scheduler = cfg.scheduler();
    let bus = EventBus::new();
    let clock = ManualClock::new();
    let name = cfg.agents[0].clone();
    let mut agent = Agent::new(
        name.clone(),
        Context::from_goal(goal),
        bus.clone(),
        Arc::new(clock.clone()),
        scheduler,
    );

    let mut pending_sample = goal.is_none();
    let mut sample_goal_published = false;
    let mut completed_at = None;
    let mut lines = Vec::new();
    for tick in 0..max_ticks {
        if pending_sample && clock.elapsed() >= cfg.goal_delay() {
            bus.publish_goal(&sample_goal())?;
            pending_sample = false;
            sample_goal_published = true;
        }

        let report = agent.tick(clock.now())?;
        lines.push(TraceLine {
            tick,
            elapsed_ms: clock.elapsed().as_millis() as u64,
            state: report.state,
            changed: report.transition.is_some(),
            step_count: agent.context().step_count,
        });
        if report.outcome != TickOutcome::Continue && completed_at.is_none() {
            completed_at = Some(tick);
        }
        if report.outcome == TickOutcome::Stopped {
            break;
        }
        clock.advance(scheduler.tick_period);
    }

    Ok(TraceOutcome {
        agent: name,
        lines,
        completed_at,
        sample_goal_published,
    })
}
