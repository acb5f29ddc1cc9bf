//! Request/response shapes for the arbiter's operations. These are the
//! library-level analogues of the request/response bodies in §6.1 — the
//! HTTP framing itself is out of scope, but an adapter sits directly on top
//! of these types.

use std::collections::HashMap;

use arbiter_core::{AgentId, SessionId, SessionStatus, StateDoc, Tick};
use chrono::{DateTime, Utc};

/// `participants` of a create-session request: role name to the agent
/// bound to it, or `None` for an open slot to be filled by `join`.
pub type Participants = HashMap<String, Option<AgentId>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateSessionOutcome {
    pub session_id: SessionId,
    pub template_id: String,
    pub status: SessionStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinSessionOutcome {
    pub session_id: SessionId,
    pub status: SessionStatus,
}

/// A session as visible to a specific participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    pub session_id: SessionId,
    pub template_id: String,
    pub status: SessionStatus,
    pub tick: Tick,
    pub state: StateDoc,
    pub role: String,
    pub legal_actions: Vec<String>,
}

/// One row of a `list_sessions` response — lighter than [`SessionView`]
/// since it is not scoped to a single role's filtered state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub template_id: String,
    pub status: SessionStatus,
    pub tick: Tick,
    pub role: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitActionOutcome {
    pub tick: Tick,
    pub state: StateDoc,
    pub status: SessionStatus,
}
