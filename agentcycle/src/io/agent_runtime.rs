//! Boundary to the concrete agent implementation.
//!
//! The [`AgentRuntime`] trait decouples the lifecycle driver from whatever
//! performs the agent's real work (memory loading, controller connection).
//! The driver awaits [`AgentRuntime::start`] before the first tick. Tests use
//! scripted runtimes that succeed or fail on demand.

use std::future::Future;

use anyhow::Result;
use tracing::info;

/// Parameters handed to [`AgentRuntime::start`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartRequest {
    /// Agent being started.
    pub agent: String,
    /// Load persisted memory on startup.
    pub load_memory: bool,
    /// Message to prompt the agent with once started.
    pub init_message: Option<String>,
    /// Identifying count for multi-agent scenarios.
    pub count_id: u32,
}

pub trait AgentRuntime: Send + Sync {
    /// Bring the agent up. Must resolve before its state machine ticks.
    fn start(&self, request: &StartRequest) -> impl Future<Output = Result<()>> + Send;
}

/// Runtime with nothing to start.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRuntime;

impl AgentRuntime for NoopRuntime {
    async fn start(&self, request: &StartRequest) -> Result<()> {
        info!(
            agent = %request.agent,
            load_memory = request.load_memory,
            count_id = request.count_id,
            "starting agent runtime"
        );
        Ok(())
    }
}
