//! State machine engine: one current state, exit/enter paired transitions.

use tracing::debug;

use crate::core::context::Context;
use crate::core::state::AgentState;

/// Lifecycle notifications fired around every transition.
///
/// Hooks only observe the context; they cannot request transitions.
pub trait StateHooks {
    fn on_enter(&mut self, _state: AgentState, _ctx: &Context) {}
    fn on_exit(&mut self, _state: AgentState, _ctx: &Context) {}
}

/// Default hooks: emit a `debug` event per enter/exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl StateHooks for TracingHooks {
    fn on_enter(&mut self, state: AgentState, ctx: &Context) {
        debug!(state = %state, step_count = ctx.step_count, "entering state");
    }

    fn on_exit(&mut self, state: AgentState, ctx: &Context) {
        debug!(state = %state, step_count = ctx.step_count, "exiting state");
    }
}

/// A transition applied by [`StateMachine::change_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AgentState,
    pub to: AgentState,
}

#[derive(Debug)]
pub struct StateMachine<H: StateHooks = TracingHooks> {
    current: AgentState,
    hooks: H,
}

impl StateMachine {
    pub fn new(initial: AgentState) -> Self {
        Self::with_hooks(initial, TracingHooks)
    }
}

impl<H: StateHooks> StateMachine<H> {
    /// Build a machine and enter `initial` right away.
    ///
    /// No goal context exists yet, so the enter hook sees a blank context.
    pub fn with_hooks(initial: AgentState, mut hooks: H) -> Self {
        hooks.on_enter(initial, &Context::default());
        Self {
            current: initial,
            hooks,
        }
    }

    pub fn current(&self) -> AgentState {
        self.current
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Exit the current state, swap in `next`, then enter it.
    pub fn change_state(&mut self, next: AgentState, ctx: &Context) -> Transition {
        let from = self.current;
        self.hooks.on_exit(from, ctx);
        self.current = next;
        self.hooks.on_enter(next, ctx);
        Transition { from, to: next }
    }

    /// Execute the current state once and apply the transition it requests.
    pub fn tick(&mut self, ctx: &mut Context) -> Option<Transition> {
        let next = self.current.execute(ctx)?;
        Some(self.change_state(next, ctx))
    }
}
