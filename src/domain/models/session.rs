//! Session state: one end-to-end run's conversation plus retry counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Conversation;

/// States of the review pipeline walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Draft,
    Implement,
    Validate,
    Review,
    Done,
}

/// One session: the conversation and the per-stage retry counters.
///
/// Mutated only by the session state machine. Counters are monotonically
/// non-decreasing within a run and reset only when the caller resets the
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub conversation: Conversation,
    pub validate_retries: u32,
    pub review_retries: u32,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation: Conversation::new(),
            validate_retries: 0,
            review_retries: 0,
            started_at: Utc::now(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
