//! Driver configuration stored in `agentcycle.toml`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::promotion::Thresholds;
use crate::scheduler::{CompletionMode, SchedulerConfig};

pub const DEFAULT_CONFIG_PATH: &str = "agentcycle.toml";

/// Driver configuration (TOML).
///
/// Missing fields default to the reference timings of the demo driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Scheduler period in milliseconds.
    pub tick_period_ms: u64,

    /// Elapsed time after goal start before `ready_to_plan` is raised.
    pub plan_ready_after_ms: u64,

    /// Elapsed time after goal start before `goal_done` is raised.
    pub goal_done_after_ms: u64,

    pub completion: CompletionMode,

    /// Names of the agents to run, one state machine each.
    pub agents: Vec<String>,

    /// Delay before the sample goal is published when none was given.
    pub goal_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 50,
            plan_ready_after_ms: 500,
            goal_done_after_ms: 1000,
            completion: CompletionMode::Stop,
            agents: vec!["Agent1".to_string(), "Agent2".to_string()],
            goal_delay_ms: 2000,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(anyhow!("tick_period_ms must be > 0"));
        }
        if self.agents.is_empty() {
            return Err(anyhow!("agents must list at least one agent"));
        }
        let mut seen = HashSet::new();
        for name in &self.agents {
            if name.trim().is_empty() {
                return Err(anyhow!("agent names must not be blank"));
            }
            if !seen.insert(name.as_str()) {
                return Err(anyhow!("duplicate agent name '{name}'"));
            }
        }
        Ok(())
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_period: Duration::from_millis(self.tick_period_ms),
            thresholds: Thresholds {
                plan_ready_after: Duration::from_millis(self.plan_ready_after_ms),
                goal_done_after: Duration::from_millis(self.goal_done_after_ms),
            },
            completion: self.completion,
        }
    }

    pub fn goal_delay(&self) -> Duration {
        Duration::from_millis(self.goal_delay_ms)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AppConfig::default()`.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let cfg = AppConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AppConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
