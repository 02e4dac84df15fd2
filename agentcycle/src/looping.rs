//! Periodic tick loop for one agent.

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::core::machine::StateHooks;
use crate::core::state::AgentState;
use crate::scheduler::{Agent, TickOutcome, TickReport};

/// Reason why `run_agent_loop` stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStop {
    /// The agent completed its goal in stop mode.
    GoalDone,
    /// The shutdown signal fired (or its sender went away).
    Shutdown,
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub agent: String,
    pub ticks: u64,
    pub final_state: AgentState,
    pub stop: LoopStop,
}

/// Tick `agent` every `tick_period` until it stops or `shutdown` turns true.
///
/// Shutdown is only observed between ticks. A missed period delays the next
/// tick instead of bursting. Any tick error ends the loop immediately.
pub async fn run_agent_loop<H, F>(
    mut agent: Agent<H>,
    mut shutdown: watch::Receiver<bool>,
    mut on_tick: F,
) -> Result<LoopOutcome>
where
    H: StateHooks + Send,
    F: FnMut(&TickReport) + Send,
{
    let mut ticker = interval(agent.config().tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = 0u64;

    let stop = loop {
        if *shutdown.borrow() {
            break LoopStop::Shutdown;
        }
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break LoopStop::Shutdown;
                }
            }
            _ = ticker.tick() => {
                let report = agent.tick(agent.now())?;
                ticks += 1;
                on_tick(&report);
                if report.outcome == TickOutcome::Stopped {
                    break LoopStop::GoalDone;
                }
            }
        }
    };

    debug!(agent = %agent.name(), ticks, stop = ?stop, "agent loop finished");
    Ok(LoopOutcome {
        agent: agent.name().to_string(),
        ticks,
        final_state: agent.state(),
        stop,
    })
}
