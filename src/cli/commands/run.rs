//! `simforge run` — run the review pipeline for a single task.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use crate::adapters::roles::RoleSet;
use crate::application::Pipeline;
use crate::infrastructure::config::ConfigLoader;
use crate::services::UsageLedger;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task description for the component to be modeled
    pub task: String,
}

pub async fn execute(args: RunArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let ledger = if config.ledger.enabled {
        Arc::new(UsageLedger::load(&config.ledger.path))
    } else {
        Arc::new(UsageLedger::in_memory())
    };

    let roles = RoleSet::from_config(&config, ledger)?;
    let mut pipeline = Pipeline::new(roles, config.retries.clone());

    let transcript = pipeline.run(&args.task, true).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
    } else {
        for entry in &transcript {
            println!("[{}]\n{}\n", entry.role, entry.content);
        }
    }
    Ok(())
}
