//! Artifact validator port.
//!
//! Decouples the validate-relay role from the process-isolated executor so
//! tests can substitute a stub. The call is infallible by design: every
//! failure mode (timeout, crash, protocol violation, validation findings)
//! is expressed as a FAIL result, never as an error.

use async_trait::async_trait;

use crate::domain::models::ValidationResult;

#[async_trait]
pub trait ArtifactValidator: Send + Sync {
    /// Validate one artifact's raw source text.
    async fn validate(&self, artifact: &str) -> ValidationResult;
}
