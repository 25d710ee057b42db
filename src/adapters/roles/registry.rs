//! Role registry: assembles the four roles of a review pipeline.

use std::sync::Arc;

use crate::domain::errors::RoleError;
use crate::domain::models::{Config, RoleTag};
use crate::domain::ports::{ArtifactValidator, Role};
use crate::infrastructure::sandbox::IsolatedExecutor;
use crate::services::UsageLedger;

use super::api::ApiRole;
use super::briefs;
use super::relay::RelayRole;

/// The four roles the session state machine sequences.
pub struct RoleSet {
    pub draft: Arc<dyn Role>,
    pub implement: Arc<dyn Role>,
    pub validate: Arc<dyn Role>,
    pub review: Arc<dyn Role>,
}

impl RoleSet {
    /// Production wiring: API-backed reasoning roles plus the isolated
    /// executor behind the validate relay.
    pub fn from_config(config: &Config, ledger: Arc<UsageLedger>) -> Result<Self, RoleError> {
        let validator: Arc<dyn ArtifactValidator> = Arc::new(IsolatedExecutor::new(
            config.executor.clone(),
            config.stimulus.clone(),
        ));
        Self::with_validator(config, ledger, validator)
    }

    /// Same wiring with an explicit validator, for callers that substitute
    /// their own isolation mechanism.
    pub fn with_validator(
        config: &Config,
        ledger: Arc<UsageLedger>,
        validator: Arc<dyn ArtifactValidator>,
    ) -> Result<Self, RoleError> {
        let ledger = config.ledger.enabled.then_some(ledger);
        Ok(Self {
            draft: Arc::new(ApiRole::new(
                RoleTag::Draft,
                briefs::DRAFT,
                &config.api,
                ledger.clone(),
            )?),
            implement: Arc::new(ApiRole::new(
                RoleTag::Implement,
                briefs::IMPLEMENT,
                &config.api,
                ledger.clone(),
            )?),
            validate: Arc::new(RelayRole::new(validator)),
            review: Arc::new(ApiRole::new(
                RoleTag::Review,
                briefs::REVIEW,
                &config.api,
                ledger,
            )?),
        })
    }
}
