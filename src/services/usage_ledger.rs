//! Process-wide usage accounting keyed by role identity.
//!
//! Per-role token totals and priced cost, plus a cumulative total across
//! all roles. Updates are read-modify-write under a single lock so
//! concurrent sessions cannot lose increments, and the state is flushed to
//! its JSON file after every update. Lifecycle is explicit: load at
//! startup, record per call, flush on record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

/// Pricing per million tokens for a model family (USD).
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
}

/// Known model pricing, matched by substring against the reported model id.
const PRICING_TABLE: &[(&str, ModelPricing)] = &[
    ("opus", ModelPricing { input: 15.0, output: 75.0 }),
    ("sonnet", ModelPricing { input: 3.0, output: 15.0 }),
    ("haiku", ModelPricing { input: 0.80, output: 4.0 }),
];

/// Get pricing for a model by name or alias.
pub fn model_pricing(model: &str) -> Option<ModelPricing> {
    let model_lower = model.to_lowercase();
    PRICING_TABLE
        .iter()
        .find(|(name, _)| model_lower.contains(name))
        .map(|(_, pricing)| *pricing)
}

/// Estimate cost in USD for a call; unknown models price as zero.
#[allow(clippy::cast_precision_loss)]
pub fn estimate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    match model_pricing(model) {
        Some(pricing) => {
            (input_tokens as f64 * pricing.input + output_tokens as f64 * pricing.output)
                / 1_000_000.0
        }
        None => 0.0,
    }
}

/// Accumulated usage for one role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

/// Full ledger state as persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerState {
    pub cumulative_usd: f64,
    pub roles: HashMap<String, RoleUsage>,
}

/// Serialized-update usage ledger.
pub struct UsageLedger {
    path: Option<PathBuf>,
    state: RwLock<LedgerState>,
}

impl UsageLedger {
    /// Ledger with no persistence; used in tests and when disabled.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Load the ledger from `path`. A missing or unreadable file starts a
    /// fresh ledger rather than failing startup.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt usage ledger, starting fresh");
                    LedgerState::default()
                }
            },
            Err(_) => LedgerState::default(),
        };
        Self {
            path: Some(path),
            state: RwLock::new(state),
        }
    }

    /// Record one role call: increment the role's totals and the cumulative
    /// cost, then flush. The write lock is held across the flush so the
    /// load-increment-persist sequence is atomic with respect to other
    /// sessions in this process.
    pub async fn record(&self, role: &str, model: &str, input_tokens: u64, output_tokens: u64) {
        let cost = estimate_cost(model, input_tokens, output_tokens);

        let mut state = self.state.write().await;
        let usage = state.roles.entry(role.to_string()).or_default();
        usage.input_tokens += input_tokens;
        usage.output_tokens += output_tokens;
        usage.cost_usd += cost;
        state.cumulative_usd += cost;

        if let Some(path) = &self.path {
            if let Err(e) = Self::flush_to(path, &state).await {
                warn!(path = %path.display(), error = %e, "failed to flush usage ledger");
            }
        }
    }

    /// Current ledger state.
    pub async fn snapshot(&self) -> LedgerState {
        self.state.read().await.clone()
    }

    async fn flush_to(path: &Path, state: &LedgerState) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_string_pretty(state)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(path, body).await
    }
}
