//! `simforge cost` — show the cumulative usage ledger.

use anyhow::Result;
use clap::Args;

use crate::infrastructure::config::ConfigLoader;
use crate::services::UsageLedger;

#[derive(Args, Debug)]
pub struct CostArgs {}

pub async fn execute(_args: CostArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let ledger = UsageLedger::load(&config.ledger.path);
    let state = ledger.snapshot().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let mut roles: Vec<_> = state.roles.iter().collect();
    roles.sort_by(|a, b| a.0.cmp(b.0));
    for (role, usage) in roles {
        println!(
            "{role}: {} input tokens, {} output tokens, ${:.4}",
            usage.input_tokens, usage.output_tokens, usage.cost_usd
        );
    }
    println!("cumulative: ${:.4}", state.cumulative_usd);
    Ok(())
}
