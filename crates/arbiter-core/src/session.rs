//! The data model for §3 of the coordination spec: sessions, participant
//! bindings, and the append-only action log.

use core::fmt;

use crate::identity::AgentId;
use crate::template::StateDoc;

/// Opaque, globally-unique identifier for a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically non-decreasing count of accepted state transitions.
///
/// `tick` only ever increases; it is never rolled back, even when a
/// submission is rejected after partially staging a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SessionStatus {
    /// At least one role is still an open slot.
    Waiting,
    /// Every role is bound and the template has not reported a terminal state.
    Active,
    /// The template reports the state as terminal; state and tick are frozen.
    Completed,
}

/// A running instance of a template.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Session {
    pub session_id: SessionId,
    pub template_id: String,
    pub state: StateDoc,
    pub status: SessionStatus,
    pub tick: Tick,
    #[cfg_attr(feature = "serde", serde(with = "chrono::serde::ts_seconds"))]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[cfg_attr(feature = "serde", serde(with = "chrono::serde::ts_seconds"))]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Many-to-one binding from an agent to a role in a session.
///
/// Invariants (enforced by the session store, not by this type): at most one
/// binding per `(session_id, role)`, at most one binding per `(session_id,
/// agent_id)`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantBinding {
    pub session_id: SessionId,
    pub agent_id: AgentId,
    pub role: String,
}

/// Immutable record of one accepted state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionLogEntry {
    pub entry_id: String,
    pub session_id: SessionId,
    pub agent_id: AgentId,
    pub role: String,
    pub action: String,
    /// The tick at the time of acceptance (i.e. the tick *before* this
    /// transition was applied).
    pub tick: Tick,
    #[cfg_attr(feature = "serde", serde(with = "chrono::serde::ts_seconds"))]
    pub created_at: chrono::DateTime<chrono::Utc>,
}
