//! Conversation primitives: role tags, immutable messages, and the
//! append-only conversation owned by a session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role attribution for a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    /// The caller's task input.
    Human,
    /// Produces the input/output problem statement.
    Draft,
    /// Produces or revises the component implementation.
    Implement,
    /// Relays the sandbox verdict back into the conversation.
    Validate,
    /// Physical-plausibility review ending in accept or reject.
    Review,
    /// Synthetic attribution for sentinel transcript entries.
    Error,
}

impl RoleTag {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleTag::Human => "human",
            RoleTag::Draft => "draft",
            RoleTag::Implement => "implement",
            RoleTag::Validate => "validate",
            RoleTag::Review => "review",
            RoleTag::Error => "error",
        }
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversation message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: RoleTag,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: RoleTag, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Append-only message sequence. Insertion order is the only memory the
/// roles receive; roles get a read-only view and return a new message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. There is deliberately no removal or mutation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent message attributed to `role`, if any.
    pub fn last_of(&self, role: RoleTag) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == role)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// One entry of the transcript returned by the pipeline entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub content: String,
}

impl TranscriptEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

impl From<&Message> for TranscriptEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}
