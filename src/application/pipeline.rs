//! Session state machine: sequences the four roles into one convergent
//! review walk.
//!
//! States: `Draft → Implement → Validate → Review → Done`. Each non-initial
//! state performs exactly one role invocation. The validate and review
//! stages loop back to implement until their outcome contains the
//! acceptance marker or the stage's retry ceiling forces progression — the
//! ceiling is a forward-progress guarantee, not a correctness guarantee, so
//! a run always reaches `Done`.
//!
//! Append policy is asymmetric on the validate stage: a failing outcome is
//! appended so the implement role sees concrete issues, while an accepting
//! (or ceiling-forced) outcome is consumed for routing and withheld from
//! the conversation, to avoid presenting a terse pass marker to the review
//! role as if it were discursive feedback. Review messages are always
//! appended.

use tracing::{error, info};

use crate::adapters::roles::RoleSet;
use crate::domain::models::{
    Message, PipelineState, RetryConfig, RoleTag, Session, TranscriptEntry, ACCEPTANCE_MARKER,
};

/// One pipeline over one reusable session.
pub struct Pipeline {
    roles: RoleSet,
    limits: RetryConfig,
    session: Option<Session>,
}

impl Pipeline {
    pub fn new(roles: RoleSet, limits: RetryConfig) -> Self {
        Self {
            roles,
            limits,
            session: None,
        }
    }

    /// The current session, if one has been started.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Discard the current session.
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Run the walk for one task. Returns the messages the state machine
    /// appended during this call, in chronological order; if it produced
    /// none, a single synthetic error entry. Never returns an error and
    /// never panics: role failures are logged and end the walk.
    pub async fn run(&mut self, task_text: &str, reset_session: bool) -> Vec<TranscriptEntry> {
        if reset_session {
            self.session = None;
        }
        let session = self.session.get_or_insert_with(Session::new);

        session
            .conversation
            .push(Message::new(RoleTag::Human, task_text));

        let mut transcript: Vec<TranscriptEntry> = Vec::new();
        let mut state = PipelineState::Draft;

        'walk: while state != PipelineState::Done {
            match state {
                PipelineState::Draft => {
                    let message =
                        match self.roles.draft.transform(session.conversation.messages()).await {
                            Ok(m) => m,
                            Err(e) => {
                                error!(state = ?state, error = %e, "role invocation failed");
                                break 'walk;
                            }
                        };
                    transcript.push(TranscriptEntry::from(&message));
                    session.conversation.push(message);
                    state = PipelineState::Implement;
                }

                PipelineState::Implement => {
                    let message = match self
                        .roles
                        .implement
                        .transform(session.conversation.messages())
                        .await
                    {
                        Ok(m) => m,
                        Err(e) => {
                            error!(state = ?state, error = %e, "role invocation failed");
                            break 'walk;
                        }
                    };
                    transcript.push(TranscriptEntry::from(&message));
                    session.conversation.push(message);
                    state = PipelineState::Validate;
                }

                PipelineState::Validate => {
                    let message = match self
                        .roles
                        .validate
                        .transform(session.conversation.messages())
                        .await
                    {
                        Ok(m) => m,
                        Err(e) => {
                            error!(state = ?state, error = %e, "role invocation failed");
                            break 'walk;
                        }
                    };

                    let accepted = message.content.contains(ACCEPTANCE_MARKER);
                    if accepted || session.validate_retries >= self.limits.validate {
                        info!(
                            accepted,
                            retries = session.validate_retries,
                            "validation stage complete"
                        );
                        // Outcome consumed for routing, withheld from the
                        // conversation.
                        state = PipelineState::Review;
                    } else {
                        session.validate_retries += 1;
                        transcript.push(TranscriptEntry::from(&message));
                        session.conversation.push(message);
                        state = PipelineState::Implement;
                    }
                }

                PipelineState::Review => {
                    let message = match self
                        .roles
                        .review
                        .transform(session.conversation.messages())
                        .await
                    {
                        Ok(m) => m,
                        Err(e) => {
                            error!(state = ?state, error = %e, "role invocation failed");
                            break 'walk;
                        }
                    };

                    let accepted = message.content.contains(ACCEPTANCE_MARKER);
                    transcript.push(TranscriptEntry::from(&message));
                    session.conversation.push(message);

                    if accepted || session.review_retries >= self.limits.review {
                        info!(
                            accepted,
                            retries = session.review_retries,
                            "review stage complete"
                        );
                        state = PipelineState::Done;
                    } else {
                        session.review_retries += 1;
                        state = PipelineState::Implement;
                    }
                }

                PipelineState::Done => break 'walk,
            }
        }

        if transcript.is_empty() {
            transcript.push(TranscriptEntry::new("error", "Error. No response generated."));
        }
        transcript
    }
}
