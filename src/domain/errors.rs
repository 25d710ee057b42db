//! Domain errors for the simforge review pipeline.

use thiserror::Error;

/// Errors raised by role adapters (the opaque reasoning capabilities).
///
/// A role failure is a transport-level event: the session state machine
/// logs it and ends the current walk; it never propagates out of the
/// pipeline entry point.
#[derive(Debug, Error)]
pub enum RoleError {
    #[error("Role not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Empty response from role")]
    EmptyResponse,
}

/// Failure classes internal to a single validation attempt.
///
/// Every variant is converted into a structured FAIL outcome before it
/// reaches the session state machine; none is fatal to a session.
/// `Discovery` and `Construction` abort the attempt with a single issue,
/// `RuntimeStep` is recovered per stimulus regime, and the executor-level
/// variants consume an ordinary retry slot.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("{0}")]
    Parse(String),

    #[error("No valid component constructor found in artifact.")]
    Discovery,

    #[error("Fatal error: {0}")]
    Construction(String),

    #[error("Step/update failed on {regime} input: {message}")]
    RuntimeStep { regime: String, message: String },

    #[error("Validation script failed: {0}")]
    Process(String),

    #[error("Invalid JSON output: {error}\nRaw output:\n{raw}")]
    Protocol { error: String, raw: String },
}
