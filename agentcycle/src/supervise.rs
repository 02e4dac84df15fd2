//! Orchestration for `agentcycle run`.
//!
//! Starts every configured agent through the [`AgentRuntime`] boundary, then
//! drives all of them concurrently on one shared bus. In stop mode the first
//! `"goal_done"` ends the whole run; in persistent mode the run lasts until
//! interrupted.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::bus::EventBus;
use crate::clock::{Clock, SystemClock};
use crate::core::context::Context;
use crate::core::types::{GoalDone, GoalPayload};
use crate::io::agent_runtime::{AgentRuntime, StartRequest};
use crate::io::config::AppConfig;
use crate::looping::{LoopOutcome, run_agent_loop};
use crate::scheduler::{Agent, CompletionMode};

/// Goal published by the driver when no initial goal was supplied.
pub fn sample_goal() -> GoalPayload {
    GoalPayload::new(1)
}

/// Per-invocation options for [`run_supervised`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Initial goal seeded into every agent. When `None`, the sample goal is
    /// published after the configured delay.
    pub goal: Option<GoalPayload>,
    pub load_memory: bool,
    pub init_message: Option<String>,
    /// Count id of the first agent; later agents get consecutive ids.
    pub count_id: u32,
}

/// Reason why `run_supervised` stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorStop {
    /// An agent announced goal completion (stop mode).
    GoalDone { agent: String },
    /// The interrupt future resolved.
    Interrupted,
    /// Every agent loop ended on its own.
    AgentsFinished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorOutcome {
    pub stop: SupervisorStop,
    /// Completion announcements received while running.
    pub completions: u64,
    /// One entry per agent, sorted by agent name.
    pub loops: Vec<LoopOutcome>,
}

/// An agent runtime failed to start; no agent was ticked.
#[derive(Debug)]
pub struct StartupError {
    pub agent: String,
    pub source: anyhow::Error,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent '{}' failed to start", self.agent)
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Run every agent in `cfg` until completion, interruption or failure.
pub async fn run_supervised<R, I>(
    cfg: &AppConfig,
    options: &RunOptions,
    runtime: &R,
    interrupt: I,
) -> Result<SupervisorOutcome>
where
    R: AgentRuntime,
    I: Future<Output = ()>,
{
    cfg.validate()?;
    let scheduler = cfg.scheduler();
    let bus = EventBus::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<String>();
    let forward = move |done: &GoalDone| -> Result<()> {
        info!(agent = %done.agent, "goal completed");
        // The receiver only goes away once the run is over.
        let _ = done_tx.send(done.agent.clone());
        Ok(())
    };
    match scheduler.completion {
        CompletionMode::Stop => bus.subscribe_goal_done_once(forward),
        CompletionMode::Persistent => bus.subscribe_goal_done(forward),
    };

    let mut agents = Vec::with_capacity(cfg.agents.len());
    for (index, name) in cfg.agents.iter().enumerate() {
        let request = StartRequest {
            agent: name.clone(),
            load_memory: options.load_memory,
            init_message: options.init_message.clone(),
            count_id: options.count_id + index as u32,
        };
        runtime
            .start(&request)
            .await
            .map_err(|source| StartupError {
                agent: name.clone(),
                source,
            })?;
        let ctx = Context::from_goal(options.goal.as_ref());
        agents.push(Agent::new(
            name.clone(),
            ctx,
            bus.clone(),
            Arc::clone(&clock),
            scheduler,
        ));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut loops = JoinSet::new();
    for agent in agents {
        loops.spawn(run_agent_loop(agent, shutdown_rx.clone(), |_| {}));
    }

    let sample = options.goal.is_none().then(|| {
        let bus = bus.clone();
        let delay = cfg.goal_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("publishing sample goal");
            if let Err(err) = bus.publish_goal(&sample_goal()) {
                warn!(error = %format!("{err:#}"), "sample goal delivery failed");
            }
        })
    });

    tokio::pin!(interrupt);
    let mut completions = 0u64;
    let mut finished = Vec::new();
    let stop = loop {
        tokio::select! {
            biased;
            Some(agent) = done_rx.recv() => {
                completions += 1;
                match scheduler.completion {
                    CompletionMode::Stop => break SupervisorStop::GoalDone { agent },
                    CompletionMode::Persistent => debug!(agent = %agent, completions, "completion recorded"),
                }
            }
            () = &mut interrupt => break SupervisorStop::Interrupted,
            joined = loops.join_next() => match joined {
                None => break SupervisorStop::AgentsFinished,
                Some(result) => finished.push(result.context("agent task panicked")??),
            },
        }
    };

    let _ = shutdown_tx.send(true);
    if let Some(sample) = sample {
        sample.abort();
    }
    while let Some(result) = loops.join_next().await {
        finished.push(result.context("agent task panicked")??);
    }
    finished.sort_by(|a, b| a.agent.cmp(&b.agent));

    info!(stop = ?stop, completions, "run finished");
    Ok(SupervisorOutcome {
        stop,
        completions,
        loops: finished,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::io::agent_runtime::NoopRuntime;
    use crate::looping::LoopStop;
    use crate::test_support::ScriptedRuntime;

    fn two_agents(completion: CompletionMode) -> AppConfig {
        AppConfig {
            completion,
            agents: vec!["Agent1".to_string(), "Agent2".to_string()],
            ..AppConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_mode_ends_on_first_completion() {
        let outcome = run_supervised(
            &two_agents(CompletionMode::Stop),
            &RunOptions::default(),
            &NoopRuntime,
            std::future::pending(),
        )
        .await
        .expect("run");

        let SupervisorStop::GoalDone { agent } = &outcome.stop else {
            panic!("expected goal done, got {:?}", outcome.stop);
        };
        assert!(agent == "Agent1" || agent == "Agent2");
        assert_eq!(outcome.completions, 1);
        assert_eq!(outcome.loops.len(), 2);
        assert!(
            outcome
                .loops
                .iter()
                .any(|looped| looped.stop == LoopStop::GoalDone)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_mode_runs_until_interrupted() {
        let outcome = run_supervised(
            &two_agents(CompletionMode::Persistent),
            &RunOptions::default(),
            &NoopRuntime,
            tokio::time::sleep(Duration::from_millis(3_000)),
        )
        .await
        .expect("run");

        assert_eq!(outcome.stop, SupervisorStop::Interrupted);
        assert!(outcome.completions > 0);
        assert!(
            outcome
                .loops
                .iter()
                .all(|looped| looped.stop == LoopStop::Shutdown)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn runtimes_start_in_order_with_consecutive_count_ids() {
        let runtime = ScriptedRuntime::default();
        let options = RunOptions {
            load_memory: true,
            init_message: Some("hello".to_string()),
            count_id: 4,
            ..RunOptions::default()
        };

        run_supervised(
            &two_agents(CompletionMode::Stop),
            &options,
            &runtime,
            std::future::pending(),
        )
        .await
        .expect("run");

        let requests = runtime.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].agent, "Agent1");
        assert_eq!(requests[0].count_id, 4);
        assert_eq!(requests[1].count_id, 5);
        assert!(requests.iter().all(|req| req.load_memory));
        assert_eq!(requests[1].init_message.as_deref(), Some("hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn startup_failure_aborts_before_ticking() {
        let runtime = ScriptedRuntime::failing_for("Agent2");
        let err = run_supervised(
            &two_agents(CompletionMode::Stop),
            &RunOptions::default(),
            &runtime,
            std::future::pending(),
        )
        .await
        .unwrap_err();

        let startup = err.downcast_ref::<StartupError>().expect("startup error");
        assert_eq!(startup.agent, "Agent2");
        assert!(format!("{err:#}").contains("scripted failure"));
    }
}
