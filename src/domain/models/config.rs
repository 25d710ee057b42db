//! Configuration model with serde defaults.
//!
//! Loaded hierarchically by `infrastructure::config::ConfigLoader`:
//! programmatic defaults, then `.simforge/config.yaml`, then
//! `.simforge/local.yaml`, then `SIMFORGE_*` environment variables.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub executor: ExecutorConfig,
    pub retries: RetryConfig,
    pub stimulus: StimulusConfig,
    pub ledger: LedgerConfig,
}

/// Endpoint and sampling parameters for the reasoning-role API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL.
    pub base_url: String,
    /// API key; falls back to the `ANTHROPIC_API_KEY` environment variable.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per role response.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: None,
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            timeout_secs: 300,
        }
    }
}

impl ApiConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
    }
}

/// Isolated-executor limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Hard wall-clock budget for one validation child process, in seconds.
    pub timeout_secs: u64,
    /// Script-engine operation ceiling inside the child; 0 disables the
    /// in-process limit and leaves only the wall-clock kill.
    pub max_operations: u64,
    /// Explicit path to the validator binary; discovered next to the
    /// current executable when unset.
    pub validator_bin: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_operations: 25_000_000,
            validator_bin: None,
        }
    }
}

/// Per-stage retry ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Validation-stage ceiling: once reached, the walk progresses to
    /// review regardless of the outcome.
    pub validate: u32,
    /// Review-stage ceiling: once reached, the walk terminates.
    pub review: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            validate: 2,
            review: 2,
        }
    }
}

/// Stimulus regime parameters for the sandbox sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    /// Inclusive lower bound of the random regime.
    pub random_min: f64,
    /// Exclusive upper bound of the random regime.
    pub random_max: f64,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            random_min: 0.1,
            random_max: 10.0,
        }
    }
}

/// Usage-ledger persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Whether role calls are recorded at all.
    pub enabled: bool,
    /// JSON file holding cumulative per-role usage.
    pub path: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: ".simforge/costs.json".to_string(),
        }
    }
}
