//! Harness tests for full agent lifecycle scenarios.
//!
//! These tests drive `Agent::tick` on a manual clock to verify end-to-end
//! behaviour: goal arrival over the bus, time-gated promotion, one transition
//! per tick, reflection cadence and completion signalling between agents.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use agentcycle::bus::EventBus;
use agentcycle::clock::{Clock, ManualClock};
use agentcycle::core::context::Context;
use agentcycle::core::state::AgentState;
use agentcycle::core::types::{GoalId, GoalPayload};
use agentcycle::scheduler::TickOutcome;
use agentcycle::test_support::{HookEvent, manual_agent};

/// Full lifecycle: idle → goal → negotiate → plan → act 20 steps → reflect.
///
/// Sequence:
/// 1. Tick with no goal: stays Waiting, context untouched.
/// 2. Publish `{"goal_id": 1}`: `has_new_goal` set through the subscription.
/// 3. Advance past 500ms and tick: Waiting → Communicating (`ready_to_plan` promoted).
/// 4. Tick: Communicating → Planning.
/// 5. Tick: Planning sets `plan_ready`, → Acting.
/// 6. 20 Acting ticks without goal completion: the 20th moves to Reflecting.
#[test]
fn goal_drives_agent_from_waiting_to_reflecting() {
    let bus = EventBus::new();
    let clock = ManualClock::new();
    let mut agent = manual_agent("Agent1", Context::new(), &bus, &clock);

    let report = agent.tick(clock.now()).expect("tick");
    assert_eq!(report.state, AgentState::Waiting);
    assert_eq!(agent.context(), Context::new());

    bus.publish_goal(&GoalPayload::new(1)).expect("publish goal");
    let ctx = agent.context();
    assert!(ctx.has_new_goal);
    assert_eq!(ctx.goal_id, Some(GoalId::Number(1)));

    clock.advance(Duration::from_millis(550));
    let report = agent.tick(clock.now()).expect("tick");
    assert!(report.promotions.ready_to_plan);
    assert_eq!(report.state, AgentState::Communicating);

    let report = agent.tick(clock.now()).expect("tick");
    assert_eq!(report.state, AgentState::Planning);

    let report = agent.tick(clock.now()).expect("tick");
    assert_eq!(report.state, AgentState::Acting);
    assert!(agent.context().plan_ready);

    for step in 1..20 {
        let report = agent.tick(clock.now()).expect("tick");
        assert_eq!(report.state, AgentState::Acting, "step {step}");
        assert_eq!(report.outcome, TickOutcome::Continue);
    }
    let report = agent.tick(clock.now()).expect("tick");
    assert_eq!(report.state, AgentState::Reflecting);
    assert_eq!(agent.context().step_count, 20);

    assert_eq!(agent.hooks().enters(AgentState::Waiting), 1);
    assert_eq!(agent.hooks().enters(AgentState::Acting), 1);
    assert_eq!(
        agent.hooks().events.last(),
        Some(&HookEvent::Enter(AgentState::Reflecting))
    );
}

/// Reflection alternates: first visit replans, second resumes acting.
#[test]
fn reflection_alternates_replanning_and_acting() {
    let bus = EventBus::new();
    let clock = ManualClock::new();
    let mut agent = manual_agent("Agent1", Context::from_goal(None), &bus, &clock);
    clock.advance(Duration::from_millis(501));

    // The clock stays still from here on, so goal completion never fires.
    let mut visited = Vec::new();
    let mut ticks = 0;
    while visited.iter().filter(|s| **s == AgentState::Reflecting).count() < 3 {
        let report = agent.tick(clock.now()).expect("tick");
        if report.transition.is_some() {
            visited.push(report.state);
        }
        ticks += 1;
        assert!(ticks < 200, "reflection never reached");
    }

    let after_reflection: Vec<AgentState> = visited
        .windows(2)
        .filter(|pair| pair[0] == AgentState::Reflecting)
        .map(|pair| pair[1])
        .collect();
    assert_eq!(
        after_reflection,
        vec![AgentState::Planning, AgentState::Acting]
    );
}

/// A goal published by one agent's driver resets every subscribed agent
/// before `publish` returns; `goal_done` from one reaches the other's
/// supervisor synchronously.
#[test]
fn goal_signals_cross_agent_boundaries_synchronously() {
    let bus = EventBus::new();
    let clock = ManualClock::new();
    let mut first = manual_agent("Agent1", Context::from_goal(None), &bus, &clock);
    let second = manual_agent("Agent2", Context::new(), &bus, &clock);
    second.update_context(|ctx| ctx.step_count = 7);

    let completed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completed);
    bus.subscribe_goal_done_once(move |done| {
        sink.lock().expect("lock").push(done.agent.clone());
        Ok(())
    });

    let delivered = bus.publish_goal(&GoalPayload::new("shared")).expect("publish");
    assert_eq!(delivered, 2);
    assert_eq!(second.context().step_count, 0);
    assert!(second.context().has_new_goal);

    // Drive the first agent to completion: plan, then wait out the goal.
    clock.advance(Duration::from_millis(501));
    while !first.context().plan_ready {
        first.tick(clock.now()).expect("tick");
    }
    clock.advance(Duration::from_millis(600));
    let report = first.tick(clock.now()).expect("tick");

    assert_eq!(report.outcome, TickOutcome::Stopped);
    assert_eq!(*completed.lock().expect("lock"), vec!["Agent1".to_string()]);
    assert_eq!(second.state(), AgentState::Waiting);
}

/// A new goal mid-cycle restarts progress but keeps the machine where it is.
#[test]
fn new_goal_mid_cycle_resets_progress_not_state() {
    let bus = EventBus::new();
    let clock = ManualClock::new();
    let mut agent = manual_agent("Agent1", Context::from_goal(None), &bus, &clock);
    clock.advance(Duration::from_millis(501));
    for _ in 0..6 {
        agent.tick(clock.now()).expect("tick");
    }
    assert_eq!(agent.state(), AgentState::Acting);
    assert!(agent.context().step_count > 0);

    bus.publish_goal(&GoalPayload::new(2)).expect("publish");

    let ctx = agent.context();
    assert_eq!(ctx.step_count, 0);
    assert!(!ctx.plan_ready);
    assert!(!ctx.ready_to_plan);
    assert_eq!(ctx.goal_start_time, Some(clock.now()));
    assert_eq!(agent.state(), AgentState::Acting);
}
