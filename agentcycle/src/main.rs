//! Lifecycle driver for autonomous worker agents.
//!
//! `run` starts every configured agent and ticks them until a goal completes;
//! `trace` replays one agent's lifecycle on a simulated clock.

use std::path::{Path, PathBuf};

use agentcycle::core::types::GoalPayload;
use agentcycle::exit_codes;
use agentcycle::io::agent_runtime::NoopRuntime;
use agentcycle::io::config::{AppConfig, DEFAULT_CONFIG_PATH, load_config, write_config};
use agentcycle::io::goal::parse_goal_payload;
use agentcycle::logging;
use agentcycle::scheduler::CompletionMode;
use agentcycle::supervise::{RunOptions, StartupError, SupervisorStop, run_supervised};
use agentcycle::trace::run_trace;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "agentcycle",
    version,
    about = "Deterministic lifecycle driver for autonomous worker agents"
)]
struct Cli {
    /// Log agent lifecycle events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file if missing.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Start the configured agents and tick them until a goal completes.
    Run {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Initial goal payload as JSON, e.g. '{"goal_id": 1}'.
        #[arg(short, long)]
        goal: Option<String>,
        /// Load agent memory from file on startup.
        #[arg(short, long)]
        load_memory: bool,
        /// Prompt the agent with this message on startup.
        #[arg(short = 'm', long)]
        init_message: Option<String>,
        /// Identifying count for multi-agent scenarios.
        #[arg(short = 'n', long, default_value_t = 0)]
        count_id: u32,
        /// Keep agents running after a goal completes.
        #[arg(short, long)]
        persistent: bool,
    },
    /// Simulate one agent on a virtual clock and print its state per tick.
    Trace {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Initial goal payload as JSON.
        #[arg(short, long)]
        goal: Option<String>,
        /// Maximum number of ticks to simulate.
        #[arg(short, long, default_value_t = 100)]
        ticks: u64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            let code = if err.downcast_ref::<StartupError>().is_some() {
                exit_codes::STARTUP_FAILED
            } else {
                exit_codes::INVALID
            };
            std::process::exit(code);
        }
    }
}

async fn run(command: Command) -> Result<i32> {
    match command {
        Command::Init { force, config } => cmd_init(&config, force),
        Command::Run {
            config,
            goal,
            load_memory,
            init_message,
            count_id,
            persistent,
        } => {
            let mut cfg = load_config(&config)?;
            if persistent {
                cfg.completion = CompletionMode::Persistent;
            }
            let options = RunOptions {
                goal: parse_goal_arg(goal.as_deref())?,
                load_memory,
                init_message,
                count_id,
            };
            cmd_run(&cfg, &options).await
        }
        Command::Trace {
            config,
            goal,
            ticks,
        } => {
            let cfg = load_config(&config)?;
            let goal = parse_goal_arg(goal.as_deref())?;
            cmd_trace(&cfg, goal.as_ref(), ticks)
        }
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        println!("{} already exists (use --force to overwrite)", path.display());
        return Ok(exit_codes::OK);
    }
    write_config(path, &AppConfig::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

async fn cmd_run(cfg: &AppConfig, options: &RunOptions) -> Result<i32> {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };
    let outcome = run_supervised(cfg, options, &NoopRuntime, interrupt).await?;
    match outcome.stop {
        SupervisorStop::GoalDone { agent } => {
            println!("Goal completed by {agent}");
            Ok(exit_codes::OK)
        }
        SupervisorStop::AgentsFinished => Ok(exit_codes::OK),
        SupervisorStop::Interrupted => {
            println!("interrupted after {} completions", outcome.completions);
            if outcome.completions > 0 {
                Ok(exit_codes::OK)
            } else {
                Ok(exit_codes::INTERRUPTED)
            }
        }
    }
}

fn cmd_trace(cfg: &AppConfig, goal: Option<&GoalPayload>, ticks: u64) -> Result<i32> {
    let outcome = run_trace(cfg, goal, ticks)?;
    for line in &outcome.lines {
        let marker = if line.changed { "*" } else { " " };
        println!(
            "{:>4} {:>6}ms {marker} {} step={}",
            line.tick, line.elapsed_ms, line.state, line.step_count
        );
    }
    if let Some(tick) = outcome.completed_at {
        println!("goal done by {} at tick {tick}", outcome.agent);
    }
    Ok(exit_codes::OK)
}

/// Parse `--goal`; malformed JSON aborts the command.
fn parse_goal_arg(raw: Option<&str>) -> Result<Option<GoalPayload>> {
    match raw {
        Some(raw) => parse_goal_payload(raw),
        None => Ok(None),
    }
}
