//! Test-only helpers: recording hooks, scripted runtimes, manual-clock agents.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};

use crate::bus::EventBus;
use crate::clock::ManualClock;
use crate::core::context::Context;
use crate::core::machine::StateHooks;
use crate::core::state::AgentState;
use crate::io::agent_runtime::{AgentRuntime, StartRequest};
use crate::io::config::{AppConfig, write_config};
use crate::scheduler::{Agent, SchedulerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Enter(AgentState),
    Exit(AgentState),
}

/// Hooks that remember every lifecycle notification in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingHooks {
    pub events: Vec<HookEvent>,
}

impl RecordingHooks {
    pub fn enters(&self, state: AgentState) -> usize {
        self.events
            .iter()
            .filter(|event| **event == HookEvent::Enter(state))
            .count()
    }
}

impl StateHooks for RecordingHooks {
    fn on_enter(&mut self, state: AgentState, _ctx: &Context) {
        self.events.push(HookEvent::Enter(state));
    }

    fn on_exit(&mut self, state: AgentState, _ctx: &Context) {
        self.events.push(HookEvent::Exit(state));
    }
}

/// Runtime that records start requests and fails for one named agent.
#[derive(Debug, Default)]
pub struct ScriptedRuntime {
    fail_agent: Option<String>,
    requests: Mutex<Vec<StartRequest>>,
}

impl ScriptedRuntime {
    pub fn failing_for(agent: &str) -> Self {
        Self {
            fail_agent: Some(agent.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<StartRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl AgentRuntime for ScriptedRuntime {
    async fn start(&self, request: &StartRequest) -> Result<()> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        if self.fail_agent.as_deref() == Some(request.agent.as_str()) {
            return Err(anyhow!("scripted failure for {}", request.agent));
        }
        Ok(())
    }
}

/// Agent with recording hooks on a manual clock and the reference timings.
pub fn manual_agent(
    name: &str,
    ctx: Context,
    bus: &EventBus,
    clock: &ManualClock,
) -> Agent<RecordingHooks> {
    Agent::with_hooks(
        name,
        ctx,
        bus.clone(),
        Arc::new(clock.clone()),
        SchedulerConfig::default(),
        RecordingHooks::default(),
    )
}

/// Write `cfg` to `agentcycle.toml` inside a fresh temp dir.
///
/// Keep the returned dir alive for as long as the path is used.
pub fn temp_config(cfg: &AppConfig) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("agentcycle.toml");
    write_config(&path, cfg)?;
    Ok((dir, path))
}
