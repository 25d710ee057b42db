//! Fixture role for tests: replays a scripted sequence of responses.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::RoleError;
use crate::domain::models::{Message, RoleTag};
use crate::domain::ports::Role;

/// Canned role: pops scripted responses in order, then repeats the last one.
pub struct FixtureRole {
    tag: RoleTag,
    responses: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    calls: AtomicUsize,
}

impl FixtureRole {
    pub fn new(tag: RoleTag, responses: &[&str]) -> Self {
        let queue: VecDeque<String> = responses.iter().map(|s| (*s).to_string()).collect();
        let last = queue.back().cloned().unwrap_or_default();
        Self {
            tag,
            responses: Mutex::new(queue),
            last: Mutex::new(last),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of transform calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Role for FixtureRole {
    fn tag(&self) -> RoleTag {
        self.tag
    }

    async fn transform(&self, _conversation: &[Message]) -> Result<Message, RoleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.responses.lock().await;
        let content = match queue.pop_front() {
            Some(next) => {
                *self.last.lock().await = next.clone();
                next
            }
            None => self.last.lock().await.clone(),
        };
        Ok(Message::new(self.tag, content))
    }
}

/// Role that always fails at the transport level; used to exercise the
/// pipeline's failure path.
pub struct FailingRole {
    tag: RoleTag,
}

impl FailingRole {
    pub fn new(tag: RoleTag) -> Self {
        Self { tag }
    }
}

#[async_trait]
impl Role for FailingRole {
    fn tag(&self) -> RoleTag {
        self.tag
    }

    async fn transform(&self, _conversation: &[Message]) -> Result<Message, RoleError> {
        Err(RoleError::Transport("fixture transport failure".to_string()))
    }
}
