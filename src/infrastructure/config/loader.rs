//! Hierarchical configuration loading.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid executor timeout: {0}s. Must be between 1 and 600")]
    InvalidTimeout(u64),

    #[error("Invalid retry ceiling: {0}. Must be at most 10")]
    InvalidRetryCeiling(u32),

    #[error("Invalid stimulus range [{0}, {1}). Bounds must satisfy 0 <= min < max")]
    InvalidStimulusRange(f64, f64),

    #[error("Model identifier cannot be empty")]
    EmptyModel,

    #[error("Invalid max_tokens: {0}. Must be positive")]
    InvalidMaxTokens(u32),

    #[error("Ledger path cannot be empty when the ledger is enabled")]
    EmptyLedgerPath,
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `.simforge/config.yaml` (project config)
    /// 3. `.simforge/local.yaml` (project local overrides, optional)
    /// 4. Environment variables (`SIMFORGE_*` prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".simforge/config.yaml"))
            .merge(Yaml::file(".simforge/local.yaml"))
            .merge(Env::prefixed("SIMFORGE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.executor.timeout_secs == 0 || config.executor.timeout_secs > 600 {
            return Err(ConfigError::InvalidTimeout(config.executor.timeout_secs));
        }

        if config.retries.validate > 10 {
            return Err(ConfigError::InvalidRetryCeiling(config.retries.validate));
        }
        if config.retries.review > 10 {
            return Err(ConfigError::InvalidRetryCeiling(config.retries.review));
        }

        if config.stimulus.random_min < 0.0
            || config.stimulus.random_min >= config.stimulus.random_max
        {
            return Err(ConfigError::InvalidStimulusRange(
                config.stimulus.random_min,
                config.stimulus.random_max,
            ));
        }

        if config.api.model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if config.api.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(config.api.max_tokens));
        }

        if config.ledger.enabled && config.ledger.path.is_empty() {
            return Err(ConfigError::EmptyLedgerPath);
        }

        Ok(())
    }
}
