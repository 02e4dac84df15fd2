//! Per-agent tick driver.
//!
//! An [`Agent`] bundles one context and one state machine. Each
//! [`Agent::tick`] promotes time-gated flags, advances the machine by at most
//! one transition and announces goal completion on the bus.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bus::EventBus;
use crate::clock::Clock;
use crate::core::context::Context;
use crate::core::machine::{StateHooks, StateMachine, TracingHooks, Transition};
use crate::core::promotion::{Promotions, Thresholds, promote};
use crate::core::state::AgentState;
use crate::core::types::GoalDone;

/// What an agent does once its goal completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionMode {
    /// Announce completion and stop ticking.
    #[default]
    Stop,
    /// Announce completion, clear `goal_done` and keep ticking.
    Persistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub tick_period: Duration,
    pub thresholds: Thresholds,
    pub completion: CompletionMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(50),
            thresholds: Thresholds::default(),
            completion: CompletionMode::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Completion was announced; the agent keeps running.
    GoalDone,
    /// Completion was announced and the agent stopped, or it was already stopped.
    Stopped,
}

/// Everything one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub state: AgentState,
    pub transition: Option<Transition>,
    pub promotions: Promotions,
    pub outcome: TickOutcome,
}

pub struct Agent<H: StateHooks = TracingHooks> {
    name: String,
    ctx: Arc<Mutex<Context>>,
    machine: StateMachine<H>,
    bus: EventBus,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    started_at: Instant,
    stopped: bool,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        ctx: Context,
        bus: EventBus,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self::with_hooks(name, ctx, bus, clock, config, TracingHooks)
    }
}

impl<H: StateHooks> Agent<H> {
    /// Create the agent in Waiting and subscribe it to goal arrivals.
    ///
    /// Until the first goal arrives, elapsed time is measured from now.
    pub fn with_hooks(
        name: impl Into<String>,
        ctx: Context,
        bus: EventBus,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
        hooks: H,
    ) -> Self {
        let name = name.into();
        let ctx = Arc::new(Mutex::new(ctx));
        let started_at = clock.now();
        let machine = StateMachine::with_hooks(AgentState::INITIAL, hooks);
        info!(agent = %name, state = %machine.current(), "agent started");

        {
            let ctx = Arc::clone(&ctx);
            let clock = Arc::clone(&clock);
            let agent = name.clone();
            bus.subscribe_goal(move |goal| {
                lock(&ctx).reset_for_goal(goal, clock.now());
                debug!(agent = %agent, goal_id = ?goal.goal_id, "goal received");
                Ok(())
            });
        }

        Self {
            name,
            ctx,
            machine,
            bus,
            clock,
            config,
            started_at,
            stopped: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> AgentState {
        self.machine.current()
    }

    pub fn hooks(&self) -> &H {
        self.machine.hooks()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current time on the agent's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Copy of the current context.
    pub fn context(&self) -> Context {
        lock(&self.ctx).clone()
    }

    /// Mutate the context directly, e.g. to stand in for external agent logic.
    pub fn update_context<R>(&self, f: impl FnOnce(&mut Context) -> R) -> R {
        f(&mut lock(&self.ctx))
    }

    /// Run one scheduler tick at `now`.
    ///
    /// A stopped agent does nothing. The context lock is released before
    /// `"goal_done"` is published.
    pub fn tick(&mut self, now: Instant) -> Result<TickReport> {
        if self.stopped {
            return Ok(TickReport {
                state: self.state(),
                transition: None,
                promotions: Promotions::default(),
                outcome: TickOutcome::Stopped,
            });
        }

        let (promotions, transition, goal_done) = {
            let mut ctx = lock(&self.ctx);
            let since = ctx.goal_start_time.unwrap_or(self.started_at);
            let elapsed = now.saturating_duration_since(since);
            let promotions = promote(&mut ctx, elapsed, &self.config.thresholds);
            let transition = self.machine.tick(&mut ctx);
            (promotions, transition, ctx.goal_done)
        };

        if promotions.any() {
            debug!(
                agent = %self.name,
                ready_to_plan = promotions.ready_to_plan,
                goal_done = promotions.goal_done,
                "flags promoted"
            );
        }
        if let Some(transition) = transition {
            info!(agent = %self.name, from = %transition.from, to = %transition.to, "state changed");
        }

        let outcome = if goal_done {
            self.bus
                .publish_goal_done(&GoalDone {
                    agent: self.name.clone(),
                })
                .with_context(|| format!("announce goal completion for {}", self.name))?;
            match self.config.completion {
                CompletionMode::Stop => {
                    self.stopped = true;
                    info!(agent = %self.name, "goal done, stopping");
                    TickOutcome::Stopped
                }
                CompletionMode::Persistent => {
                    lock(&self.ctx).goal_done = false;
                    debug!(agent = %self.name, "goal done, continuing");
                    TickOutcome::GoalDone
                }
            }
        } else {
            TickOutcome::Continue
        };

        Ok(TickReport {
            state: self.state(),
            transition,
            promotions,
            outcome,
        })
    }
}

fn lock(ctx: &Mutex<Context>) -> MutexGuard<'_, Context> {
    ctx.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
