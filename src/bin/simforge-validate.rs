//! Validator child process.
//!
//! Loads exactly one artifact from the path argument, runs the sandbox
//! harness against it, and prints a single JSON line
//! `{"status": "pass"|"fail", "issues": [...]}` to stdout, exiting 0.
//! Any other exit code means fatal failure, with diagnostics on stderr.
//!
//! This binary is spawned by the isolated executor; crashes, loops, and
//! resource exhaustion in untrusted artifacts end here, not in the
//! orchestrator.

use std::path::PathBuf;

use clap::Parser;

use simforge::infrastructure::sandbox::{validate_source, HarnessOptions};

#[derive(Parser, Debug)]
#[command(name = "simforge-validate")]
#[command(about = "Validate one generated component artifact in isolation")]
struct Args {
    /// Path to the artifact source file
    path: PathBuf,

    /// Script-engine operation ceiling (0 = unlimited)
    #[arg(long, default_value_t = 25_000_000)]
    max_operations: u64,

    /// Inclusive lower bound of the random stimulus regime
    #[arg(long, default_value_t = 0.1)]
    random_min: f64,

    /// Exclusive upper bound of the random stimulus regime
    #[arg(long, default_value_t = 10.0)]
    random_max: f64,

    /// Fixed RNG seed for reproducible stimulus
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    let args = Args::parse();

    let source = match std::fs::read_to_string(&args.path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("cannot read artifact {}: {e}", args.path.display());
            std::process::exit(1);
        }
    };

    let opts = HarnessOptions {
        max_operations: args.max_operations,
        random_min: args.random_min,
        random_max: args.random_max,
        seed: args.seed,
    };
    let result = validate_source(&source, &opts);

    match serde_json::to_string(&result) {
        Ok(line) => println!("{line}"),
        Err(e) => {
            eprintln!("cannot encode result: {e}");
            std::process::exit(1);
        }
    }
}
