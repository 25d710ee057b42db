//! `simforge validate` — validate one artifact file through the isolated
//! executor.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::domain::ports::ArtifactValidator;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::sandbox::IsolatedExecutor;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the artifact source file
    pub path: PathBuf,
}

pub async fn execute(args: ValidateArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let source = std::fs::read_to_string(&args.path)
        .with_context(|| format!("cannot read artifact {}", args.path.display()))?;

    let executor = IsolatedExecutor::new(config.executor.clone(), config.stimulus.clone());
    let result = executor.validate(&source).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.passed() {
        println!("PASS");
    } else {
        println!("FAIL");
        for issue in &result.issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}
