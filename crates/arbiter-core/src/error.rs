//! The error taxonomy of §7: one variant per kind, carrying enough
//! structured context to log without string-matching.

use crate::session::{SessionId, Tick};

/// Stable classification of an error, independent of the message text.
///
/// A transport adapter maps each kind to an HTTP status per §7; this crate
/// carries only the kind, never a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    InvalidRequest,
    InvalidAction,
    AlreadyActed,
    Conflict,
}

/// Errors surfaced by the arbiter and session store.
#[derive(Debug, thiserror::Error)]
pub enum ArbiterError {
    #[error("missing or unresolvable bearer secret")]
    Unauthorized,

    #[error("agent {agent_id} is not a participant of session {session_id}")]
    Forbidden {
        agent_id: String,
        session_id: SessionId,
    },

    #[error("agent {0} is not one of the session's listed participants")]
    CallerNotParticipant(String),

    #[error("unknown template {0:?}")]
    UnknownTemplate(String),

    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("agent {0} not found")]
    AgentNotFound(String),

    #[error("malformed request: {0}")]
    InvalidRequest(String),

    #[error("action {action:?} is not legal for role {role:?}: {reason}")]
    InvalidAction {
        role: String,
        action: String,
        reason: &'static str,
    },

    #[error("role {role:?} has already acted this phase")]
    AlreadyActed { role: String },

    #[error(
        "expected_tick {expected:?} does not match current tick {actual} for session {session_id}"
    )]
    TickConflict {
        session_id: SessionId,
        expected: Option<Tick>,
        actual: Tick,
    },

    #[error("role {0:?} is already bound")]
    RoleAlreadyBound(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl ArbiterError {
    /// Classifies this error per the taxonomy in §7.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArbiterError::Unauthorized => ErrorKind::Unauthorized,
            ArbiterError::Forbidden { .. } | ArbiterError::CallerNotParticipant(_) => {
                ErrorKind::Forbidden
            }
            ArbiterError::UnknownTemplate(_)
            | ArbiterError::SessionNotFound(_)
            | ArbiterError::AgentNotFound(_) => ErrorKind::NotFound,
            ArbiterError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ArbiterError::InvalidAction { .. } | ArbiterError::Template(_) => {
                ErrorKind::InvalidAction
            }
            ArbiterError::AlreadyActed { .. } => ErrorKind::AlreadyActed,
            ArbiterError::TickConflict { .. } | ArbiterError::RoleAlreadyBound(_) => {
                ErrorKind::Conflict
            }
        }
    }
}

/// Failure surfaced by a template's pure operations.
///
/// The arbiter never trusts a template to have validated an action before
/// calling `apply_action` — any failure here is folded into
/// `ArbiterError::InvalidAction` by the arbiter, since from the client's
/// point of view a template bug looks identical to an illegal action.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("action {action:?} is not legal for role {role:?} in the current state")]
    IllegalAction { role: String, action: String },
}
