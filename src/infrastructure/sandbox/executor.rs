//! Process-isolated execution of the sandbox harness.
//!
//! Untrusted generated code may loop, exhaust resources, or crash; running
//! the harness in a separate, time-bounded child process guarantees the
//! orchestrator always receives a structured result or a bounded failure,
//! never a hang. The wire protocol is deliberately narrow: the child gets
//! one file-system path argument and prints one JSON line
//! `{"status": "pass"|"fail", "issues": [...]}` on success.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::SandboxError;
use crate::domain::models::{ExecutorConfig, StimulusConfig, ValidationResult};
use crate::domain::ports::ArtifactValidator;

/// Name of the sibling validator binary.
pub const VALIDATOR_BIN: &str = "simforge-validate";

/// Shape of the child's single stdout line.
#[derive(Debug, Deserialize)]
struct WireResult {
    status: String,
    #[serde(default)]
    issues: Vec<String>,
}

/// Runs the sandbox harness against one artifact in a child process with a
/// hard wall-clock budget.
pub struct IsolatedExecutor {
    executor: ExecutorConfig,
    stimulus: StimulusConfig,
}

impl IsolatedExecutor {
    pub fn new(executor: ExecutorConfig, stimulus: StimulusConfig) -> Self {
        Self { executor, stimulus }
    }

    /// Locate the validator binary: an explicit config path wins, otherwise
    /// it is discovered next to the current executable (covering both
    /// installed layouts and cargo's `target/*/deps` test layout).
    fn find_binary(&self) -> Result<PathBuf, String> {
        if let Some(path) = &self.executor.validator_bin {
            return Ok(PathBuf::from(path));
        }

        let exe = std::env::current_exe().map_err(|e| e.to_string())?;
        let mut dirs = Vec::new();
        if let Some(dir) = exe.parent() {
            dirs.push(dir.to_path_buf());
            if let Some(parent) = dir.parent() {
                dirs.push(parent.to_path_buf());
            }
        }
        for dir in dirs {
            let candidate = dir.join(VALIDATOR_BIN);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(format!(
            "validator binary '{}' not found next to {}",
            VALIDATOR_BIN,
            exe.display()
        ))
    }

    async fn run_child(&self, artifact: &str) -> ValidationResult {
        let binary = match self.find_binary() {
            Ok(path) => path,
            Err(e) => return process_failure(e),
        };

        // Private, ephemeral staging area visible only to the child.
        let staging = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => return process_failure(e.to_string()),
        };
        let artifact_path = staging.path().join("generated_component.rhai");
        if let Err(e) = tokio::fs::write(&artifact_path, artifact).await {
            return process_failure(e.to_string());
        }

        let mut cmd = Command::new(&binary);
        cmd.arg(&artifact_path)
            .arg("--max-operations")
            .arg(self.executor.max_operations.to_string())
            .arg("--random-min")
            .arg(self.stimulus.random_min.to_string())
            .arg("--random-max")
            .arg(self.stimulus.random_max.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(binary = %binary.display(), artifact = %artifact_path.display(), "spawning validator");

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return process_failure(format!("failed to spawn {}: {e}", binary.display()))
            }
        };

        let budget = Duration::from_secs(self.executor.timeout_secs);
        let output = match tokio::time::timeout(budget, child.wait_with_output()).await {
            // Dropping the in-flight future kills the child (kill_on_drop).
            Err(_) => {
                return process_failure(format!(
                    "timed out after {}s",
                    self.executor.timeout_secs
                ))
            }
            Ok(Err(e)) => return process_failure(e.to_string()),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return process_failure(stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_output(&stdout)
    }

    /// Decode the child's stdout. Any shape violation of the protocol is a
    /// failure outcome, never an error to propagate.
    fn parse_output(stdout: &str) -> ValidationResult {
        let raw = stdout.trim();
        match serde_json::from_str::<WireResult>(raw) {
            Ok(wire) if wire.status.eq_ignore_ascii_case("pass") => ValidationResult::pass(),
            Ok(wire) => ValidationResult::fail(wire.issues),
            Err(e) => ValidationResult::fail_with(
                SandboxError::Protocol {
                    error: e.to_string(),
                    raw: raw.to_string(),
                }
                .to_string(),
            ),
        }
    }
}

fn process_failure(detail: impl AsRef<str>) -> ValidationResult {
    ValidationResult::fail_with(SandboxError::Process(detail.as_ref().to_string()).to_string())
}

#[async_trait]
impl ArtifactValidator for IsolatedExecutor {
    async fn validate(&self, artifact: &str) -> ValidationResult {
        self.run_child(artifact).await
    }
}
