//! Integration tests for the session state machine's routing, retry
//! ceilings, and append policy, using fixture roles throughout: the state
//! machine treats all roles uniformly, so no sandbox or network is needed.

use std::sync::Arc;

use simforge::adapters::roles::{FailingRole, FixtureRole, RoleSet};
use simforge::application::Pipeline;
use simforge::domain::models::{RetryConfig, RoleTag};

const ARTIFACT: &str = "fn motor(name) { component(name) }";

fn fixture_roles(validate: &[&str], review: &[&str]) -> (RoleSet, Arc<FixtureRole>) {
    let validate_role = Arc::new(FixtureRole::new(RoleTag::Validate, validate));
    let roles = RoleSet {
        draft: Arc::new(FixtureRole::new(RoleTag::Draft, &["problem statement"])),
        implement: Arc::new(FixtureRole::new(RoleTag::Implement, &[ARTIFACT])),
        validate: validate_role.clone(),
        review: Arc::new(FixtureRole::new(RoleTag::Review, review)),
    };
    (roles, validate_role)
}

#[tokio::test]
async fn test_accepting_walk_visits_each_stage_once() {
    let (roles, validate_role) = fixture_roles(&["PASS"], &["physically sound. PASS"]);
    let mut pipeline = Pipeline::new(roles, RetryConfig::default());

    let transcript = pipeline.run("model a DC motor", true).await;

    let roles_seen: Vec<&str> = transcript.iter().map(|e| e.role.as_str()).collect();
    assert_eq!(roles_seen, vec!["draft", "implement", "review"]);
    assert_eq!(validate_role.calls(), 1);

    let session = pipeline.session().unwrap();
    assert_eq!(session.validate_retries, 0);
    assert_eq!(session.review_retries, 0);

    // The accepting validation outcome is consumed for routing but withheld
    // from the conversation.
    let conversation_roles: Vec<RoleTag> = session
        .conversation
        .messages()
        .iter()
        .map(|m| m.role)
        .collect();
    assert_eq!(
        conversation_roles,
        vec![
            RoleTag::Human,
            RoleTag::Draft,
            RoleTag::Implement,
            RoleTag::Review
        ]
    );
}

#[tokio::test]
async fn test_validate_counter_saturates_and_forces_progression() {
    // Every validation outcome fails; the third one must route forward
    // regardless of its content.
    let (roles, validate_role) =
        fixture_roles(&["FAIL: No ports defined."], &["acceptable. PASS"]);
    let mut pipeline = Pipeline::new(roles, RetryConfig::default());

    let transcript = pipeline.run("model a battery", true).await;

    assert_eq!(validate_role.calls(), 3);
    let session = pipeline.session().unwrap();
    assert_eq!(session.validate_retries, 2);
    assert_eq!(session.review_retries, 0);

    let roles_seen: Vec<&str> = transcript.iter().map(|e| e.role.as_str()).collect();
    assert_eq!(
        roles_seen,
        vec![
            "draft",
            "implement",
            "validate",
            "implement",
            "validate",
            "implement",
            "review"
        ]
    );

    // Only the two retry-routing outcomes were appended; the ceiling-forced
    // third outcome was withheld.
    let validate_messages = session
        .conversation
        .messages()
        .iter()
        .filter(|m| m.role == RoleTag::Validate)
        .count();
    assert_eq!(validate_messages, 2);
}

#[tokio::test]
async fn test_review_rejections_loop_back_then_terminate() {
    // Review rejects forever; after two retries the third review outcome
    // terminates the walk regardless.
    let (roles, validate_role) = fixture_roles(&["PASS"], &["REJECT: unit mismatch"]);
    let mut pipeline = Pipeline::new(roles, RetryConfig::default());

    let transcript = pipeline.run("model a gearbox", true).await;

    let session = pipeline.session().unwrap();
    assert_eq!(session.review_retries, 2);
    assert_eq!(validate_role.calls(), 3);

    // Review messages are always appended, accept or reject.
    let review_messages = session
        .conversation
        .messages()
        .iter()
        .filter(|m| m.role == RoleTag::Review)
        .count();
    assert_eq!(review_messages, 3);

    let roles_seen: Vec<&str> = transcript.iter().map(|e| e.role.as_str()).collect();
    assert_eq!(
        roles_seen,
        vec![
            "draft", "implement", "review", "implement", "review", "implement", "review"
        ]
    );
}

#[tokio::test]
async fn test_mixed_retries_across_both_stages() {
    // First validation fails, second passes; first review rejects, second
    // accepts.
    let (roles, validate_role) = fixture_roles(
        &["FAIL: No logged variables.", "PASS", "PASS"],
        &["REJECT: impossible efficiency", "fine. PASS"],
    );
    let mut pipeline = Pipeline::new(roles, RetryConfig::default());

    pipeline.run("model a PMS motor", true).await;

    let session = pipeline.session().unwrap();
    assert_eq!(session.validate_retries, 1);
    assert_eq!(session.review_retries, 1);
    assert_eq!(validate_role.calls(), 3);
}

#[tokio::test]
async fn test_session_reuse_and_reset() {
    let (roles, _) = fixture_roles(&["PASS"], &["PASS"]);
    let mut pipeline = Pipeline::new(roles, RetryConfig::default());

    pipeline.run("first task", true).await;
    let first_id = pipeline.session().unwrap().id;
    let first_len = pipeline.session().unwrap().conversation.len();

    // Without reset the same session accumulates.
    pipeline.run("second task", false).await;
    assert_eq!(pipeline.session().unwrap().id, first_id);
    assert!(pipeline.session().unwrap().conversation.len() > first_len);

    // Reset starts a fresh conversation and counters.
    pipeline.run("third task", true).await;
    assert_ne!(pipeline.session().unwrap().id, first_id);
}

#[tokio::test]
async fn test_failed_draft_role_yields_sentinel_entry() {
    let (mut roles, _) = fixture_roles(&["PASS"], &["PASS"]);
    roles.draft = Arc::new(FailingRole::new(RoleTag::Draft));
    let mut pipeline = Pipeline::new(roles, RetryConfig::default());

    let transcript = pipeline.run("doomed task", true).await;

    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role, "error");
    assert_eq!(transcript[0].content, "Error. No response generated.");
}

#[tokio::test]
async fn test_failed_mid_walk_role_returns_partial_transcript() {
    let (mut roles, _) = fixture_roles(&["PASS"], &["PASS"]);
    roles.review = Arc::new(FailingRole::new(RoleTag::Review));
    let mut pipeline = Pipeline::new(roles, RetryConfig::default());

    let transcript = pipeline.run("task", true).await;

    let roles_seen: Vec<&str> = transcript.iter().map(|e| e.role.as_str()).collect();
    assert_eq!(roles_seen, vec!["draft", "implement"]);
}

#[tokio::test]
async fn test_zero_ceiling_progresses_after_first_failure() {
    let (roles, validate_role) = fixture_roles(&["FAIL: broken"], &["PASS"]);
    let mut pipeline = Pipeline::new(
        roles,
        RetryConfig {
            validate: 0,
            review: 0,
        },
    );

    pipeline.run("task", true).await;

    // Ceiling 0: the first failing outcome already forces progression.
    assert_eq!(validate_role.calls(), 1);
    let session = pipeline.session().unwrap();
    assert_eq!(session.validate_retries, 0);
}
