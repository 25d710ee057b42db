//! Domain models for the review pipeline.

pub mod config;
pub mod message;
pub mod session;
pub mod validation;

pub use config::{ApiConfig, Config, ExecutorConfig, LedgerConfig, RetryConfig, StimulusConfig};
pub use message::{Conversation, Message, RoleTag, TranscriptEntry};
pub use session::{PipelineState, Session};
pub use validation::{ValidationResult, ValidationStatus, ACCEPTANCE_MARKER};
