//! Validation outcome model shared by the sandbox harness, the isolated
//! executor, and the validate-relay role.

use serde::{Deserialize, Serialize};

/// Literal token a role emits to signal unconditional approval.
pub const ACCEPTANCE_MARKER: &str = "PASS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pass,
    Fail,
}

/// Outcome of one validation attempt. Produced once, never mutated.
///
/// Issues are kept in the order they were discovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub issues: Vec<String>,
}

impl ValidationResult {
    pub fn pass() -> Self {
        Self {
            status: ValidationStatus::Pass,
            issues: Vec::new(),
        }
    }

    pub fn fail(issues: Vec<String>) -> Self {
        Self {
            status: ValidationStatus::Fail,
            issues,
        }
    }

    pub fn fail_with(issue: impl Into<String>) -> Self {
        Self::fail(vec![issue.into()])
    }

    /// PASS iff no issues were accumulated.
    pub fn from_issues(issues: Vec<String>) -> Self {
        if issues.is_empty() {
            Self::pass()
        } else {
            Self::fail(issues)
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Pass
    }
}
