//! Simforge - bounded multi-role review pipeline for generated simulation
//! components.
//!
//! Four specialized reviewer roles iteratively produce and validate a
//! generated component script until it passes both a mechanical sandbox
//! check and a physical-correctness review, or per-stage retry budgets
//! force progression.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture
//! principles:
//!
//! - **Domain Layer** (`domain`): conversation, session, and validation
//!   models plus the `Role` and `ArtifactValidator` ports
//! - **Application Layer** (`application`): the session state machine
//! - **Service Layer** (`services`): the process-wide usage ledger
//! - **Infrastructure Layer** (`infrastructure`): configuration loading
//!   and the validation sandbox (contract types, harness, isolated
//!   executor)
//! - **Adapters** (`adapters`): role implementations behind the `Role`
//!   port
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::Pipeline;
pub use domain::models::{
    Config, Conversation, Message, RetryConfig, RoleTag, Session, TranscriptEntry,
    ValidationResult, ValidationStatus, ACCEPTANCE_MARKER,
};
pub use domain::ports::{ArtifactValidator, Role};
pub use domain::{RoleError, SandboxError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::sandbox::{HarnessOptions, IsolatedExecutor};
pub use services::UsageLedger;
