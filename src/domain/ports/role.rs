//! Role port: the uniform abstraction over the four reasoning stages.
//!
//! A role is an opaque text transform: it receives a read-only view of the
//! conversation and returns one new message. The session state machine
//! never inspects role-specific behavior, only the returned message's
//! content and role tag. Implementations are pluggable: a remote
//! text-generation service, the sandbox relay, or a canned fixture for
//! tests.

use async_trait::async_trait;

use crate::domain::errors::RoleError;
use crate::domain::models::{Message, RoleTag};

/// Port trait for one reviewer role.
///
/// Implementations must be `Send + Sync`; the pipeline itself is strictly
/// sequential, but independent sessions may run on different tasks.
#[async_trait]
pub trait Role: Send + Sync {
    /// Tag under which this role's messages are attributed.
    fn tag(&self) -> RoleTag;

    /// Transform the conversation into one new message.
    async fn transform(&self, conversation: &[Message]) -> Result<Message, RoleError>;
}
