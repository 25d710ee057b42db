//! `simforge batch` — run a list of tasks repeatedly and save transcripts.
//!
//! The task file holds one task per line; blank lines and `#` comments are
//! skipped. Each task runs a configurable number of times against a fresh
//! session, and all transcripts are written to one JSON file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::adapters::roles::RoleSet;
use crate::application::Pipeline;
use crate::domain::models::TranscriptEntry;
use crate::infrastructure::config::ConfigLoader;
use crate::services::UsageLedger;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// File with one task description per line
    pub tasks: PathBuf,

    /// Number of runs per task
    #[arg(long, default_value_t = 3)]
    pub runs: u32,

    /// Output file for all transcripts
    #[arg(long, default_value = "task_runs.json")]
    pub output: PathBuf,
}

#[derive(Debug, Serialize)]
struct TaskRuns {
    task: String,
    runs: Vec<RunRecord>,
}

#[derive(Debug, Serialize)]
struct RunRecord {
    responses: Vec<TranscriptEntry>,
}

pub async fn execute(args: BatchArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let ledger = if config.ledger.enabled {
        Arc::new(UsageLedger::load(&config.ledger.path))
    } else {
        Arc::new(UsageLedger::in_memory())
    };

    let roles = RoleSet::from_config(&config, ledger)?;
    let mut pipeline = Pipeline::new(roles, config.retries.clone());

    let raw = std::fs::read_to_string(&args.tasks)
        .with_context(|| format!("cannot read task file {}", args.tasks.display()))?;
    let tasks: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let mut all_data = Vec::with_capacity(tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        info!(task = index + 1, total = tasks.len(), "running task");
        let mut entry = TaskRuns {
            task: (*task).to_string(),
            runs: Vec::with_capacity(args.runs as usize),
        };
        for run in 0..args.runs {
            let responses = pipeline.run(task, true).await;
            info!(task = index + 1, run = run + 1, messages = responses.len(), "run done");
            entry.runs.push(RunRecord { responses });
        }
        all_data.push(entry);
    }

    let body = serde_json::to_string_pretty(&all_data)?;
    std::fs::write(&args.output, body)
        .with_context(|| format!("cannot write results to {}", args.output.display()))?;
    info!(tasks = all_data.len(), output = %args.output.display(), "batch complete");

    if json {
        println!(
            "{}",
            serde_json::json!({
                "tasks": all_data.len(),
                "runs_per_task": args.runs,
                "output": args.output,
            })
        );
    }
    Ok(())
}
