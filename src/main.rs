//! Simforge CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use simforge::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => simforge::cli::commands::run::execute(args, cli.json).await,
        Commands::Batch(args) => simforge::cli::commands::batch::execute(args, cli.json).await,
        Commands::Validate(args) => simforge::cli::commands::validate::execute(args, cli.json).await,
        Commands::Cost(args) => simforge::cli::commands::cost::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        tracing::error!(error = ?err, "command failed");
        std::process::exit(1);
    }
}
