//! Command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "simforge", version)]
#[command(about = "Multi-role review pipeline for generated simulation components")]
pub struct Cli {
    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the review pipeline for a single task
    Run(commands::run::RunArgs),
    /// Run a batch of tasks and save transcripts to a JSON file
    Batch(commands::batch::BatchArgs),
    /// Validate one artifact file through the isolated executor
    Validate(commands::validate::ValidateArgs),
    /// Show the cumulative usage ledger
    Cost(commands::cost::CostArgs),
}
