//! Validate-relay role: re-expresses a sandbox verdict as a conversation
//! message.
//!
//! The relay extracts the artifact from the most recent implement message,
//! hands it to the artifact validator, and renders the result: a bare
//! acceptance marker on PASS, or the issue list on FAIL. It performs no
//! reasoning of its own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::RoleError;
use crate::domain::models::{Message, RoleTag, ValidationResult, ACCEPTANCE_MARKER};
use crate::domain::ports::{ArtifactValidator, Role};

pub struct RelayRole {
    validator: Arc<dyn ArtifactValidator>,
}

impl RelayRole {
    pub fn new(validator: Arc<dyn ArtifactValidator>) -> Self {
        Self { validator }
    }

    fn render(result: &ValidationResult) -> String {
        if result.passed() {
            ACCEPTANCE_MARKER.to_string()
        } else {
            format!("FAIL: {}", result.issues.join("\n"))
        }
    }
}

#[async_trait]
impl Role for RelayRole {
    fn tag(&self) -> RoleTag {
        RoleTag::Validate
    }

    async fn transform(&self, conversation: &[Message]) -> Result<Message, RoleError> {
        let Some(implementation) = conversation
            .iter()
            .rev()
            .find(|m| m.role == RoleTag::Implement)
        else {
            return Ok(Message::new(
                RoleTag::Validate,
                "FAIL: No implementation found to validate.",
            ));
        };

        let result = self.validator.validate(&implementation.content).await;
        Ok(Message::new(RoleTag::Validate, Self::render(&result)))
    }
}
