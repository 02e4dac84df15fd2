//! Parsing of goal payloads supplied from outside the process.

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::types::GoalPayload;

/// Parse a JSON goal payload such as `{"goal_id": 1, "inventory": {"wood": 2}}`.
///
/// JSON `null` means "no payload" and yields `None`. Anything that is not an
/// object of that shape is an error; callers should abort startup.
pub fn parse_goal_payload(raw: &str) -> Result<Option<GoalPayload>> {
    let goal: Option<GoalPayload> =
        serde_json::from_str(raw).with_context(|| format!("parse goal payload JSON: {raw}"))?;
    debug!(goal_id = ?goal.as_ref().and_then(|g| g.goal_id.as_ref()), "goal payload parsed");
    Ok(goal)
}
