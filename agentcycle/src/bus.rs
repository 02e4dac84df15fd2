//! Synchronous publish/subscribe bus shared by every agent in the process.
//!
//! Delivery happens inside [`EventBus::publish`]: every handler registered for
//! the topic runs, in registration order, before `publish` returns. There is
//! no queue. A failing handler aborts the publish and its error reaches the
//! publisher; handlers after it are not called.
//!
//! The registry lock is released while handlers run, so handlers may publish
//! or subscribe themselves (nested delivery stays synchronous).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::core::types::{GoalDone, GoalPayload};

/// Goal arrival. Payload: [`GoalPayload`].
pub const GOAL_TOPIC: &str = "goal";
/// Goal completion. Payload: [`GoalDone`].
pub const GOAL_DONE_TOPIC: &str = "goal_done";

type Handler = Arc<dyn Fn(&Value) -> Result<()> + Send + Sync>;

/// Handle returned by `subscribe*`, unique per bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    once: bool,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    topics: HashMap<String, Vec<Subscription>>,
}

/// Cloneable handle to one shared subscription registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every future publish on `topic`.
    pub fn subscribe<F>(&self, topic: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        self.insert(topic, false, Arc::new(handler))
    }

    /// Register `handler` for the next publish on `topic` only.
    pub fn subscribe_once<F>(&self, topic: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        self.insert(topic, true, Arc::new(handler))
    }

    /// Deliver `payload` to every handler on `topic`.
    ///
    /// Returns how many handlers ran.
    pub fn publish(&self, topic: &str, payload: &Value) -> Result<usize> {
        let snapshot: Vec<(SubscriptionId, bool, Handler)> = self
            .registry()
            .topics
            .get(topic)
            .map(|subs| {
                subs.iter()
                    .map(|sub| (sub.id, sub.once, Arc::clone(&sub.handler)))
                    .collect()
            })
            .unwrap_or_default();
        debug!(topic, handlers = snapshot.len(), "publishing");

        let mut delivered = 0;
        for (id, once, handler) in snapshot {
            // A one-shot handler is claimed before it runs; a nested publish
            // may already have consumed it.
            if once && !self.remove(topic, id) {
                continue;
            }
            handler(payload).with_context(|| format!("handler for topic '{topic}' failed"))?;
            delivered += 1;
        }
        Ok(delivered)
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry().topics.get(topic).map_or(0, Vec::len)
    }

    pub fn publish_goal(&self, goal: &GoalPayload) -> Result<usize> {
        self.publish_typed(GOAL_TOPIC, goal)
    }

    pub fn publish_goal_done(&self, done: &GoalDone) -> Result<usize> {
        self.publish_typed(GOAL_DONE_TOPIC, done)
    }

    pub fn subscribe_goal<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&GoalPayload) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe(GOAL_TOPIC, typed::<GoalPayload, _>(handler))
    }

    pub fn subscribe_goal_done<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&GoalDone) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe(GOAL_DONE_TOPIC, typed::<GoalDone, _>(handler))
    }

    pub fn subscribe_goal_done_once<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&GoalDone) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe_once(GOAL_DONE_TOPIC, typed::<GoalDone, _>(handler))
    }

    fn publish_typed<T: Serialize>(&self, topic: &str, payload: &T) -> Result<usize> {
        let value = serde_json::to_value(payload)
            .with_context(|| format!("serialize payload for topic '{topic}'"))?;
        self.publish(topic, &value)
    }

    fn insert(&self, topic: &str, once: bool, handler: Handler) -> SubscriptionId {
        let mut registry = self.registry();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry
            .topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscription { id, once, handler });
        debug!(topic, once, "subscribed");
        id
    }

    fn remove(&self, topic: &str, id: SubscriptionId) -> bool {
        let mut registry = self.registry();
        let Some(subs) = registry.topics.get_mut(topic) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|sub| sub.id != id);
        subs.len() != before
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Handlers never run under this lock, so poisoning cannot leave the
        // registry half-updated.
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn typed<T, F>(handler: F) -> impl Fn(&Value) -> Result<()> + Send + Sync + 'static
where
    T: DeserializeOwned + 'static,
    F: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    move |payload| {
        let decoded: T = serde_json::from_value(payload.clone()).with_context(|| {
            format!("decode {} payload", std::any::type_name::<T>())
        })?;
        handler(&decoded)
    }
}
