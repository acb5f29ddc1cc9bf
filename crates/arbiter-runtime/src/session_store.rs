//! The session store contract (§4.5, §6.2) and an in-memory implementation.
//!
//! The specification treats the persistent store as an external
//! collaborator behind a transactional key/row interface; [`SessionStore`]
//! is that interface, and [`InMemorySessionStore`] is the one concrete
//! implementation this crate ships — sufficient for a single process and
//! for the integration tests in `tests/`. A durable-backed implementation
//! would satisfy the same trait, the way the teacher crate's `file::state`
//! repository satisfies the same `StateRepository` trait as its in-memory
//! counterpart.

use std::collections::HashMap;

use arbiter_core::{ActionLogEntry, AgentId, ParticipantBinding, Session, SessionId};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Sessions, participant bindings, and the append-only action log, as used
/// by [`crate::Arbiter`].
///
/// Every method here is one row-level primitive; the transactional grouping
/// required by §4.5 and §4.6 (e.g. "update session + append log entry as
/// one unit") is the arbiter's responsibility, enforced by holding the
/// per-session lock across the calls, not by this trait.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: Session, bindings: Vec<ParticipantBinding>);

    async fn get_session(&self, session_id: &SessionId) -> Option<Session>;

    async fn put_session(&self, session: Session);

    async fn bindings(&self, session_id: &SessionId) -> Vec<ParticipantBinding>;

    async fn binding_for(
        &self,
        session_id: &SessionId,
        agent_id: &AgentId,
    ) -> Option<ParticipantBinding>;

    async fn add_binding(&self, binding: ParticipantBinding);

    /// Sessions where `agent_id` holds a binding, most-recently-updated first.
    async fn sessions_for_agent(&self, agent_id: &AgentId) -> Vec<Session>;

    async fn append_log_entry(&self, entry: ActionLogEntry);

    /// Log entries ordered by ascending tick.
    async fn log_for(&self, session_id: &SessionId) -> Vec<ActionLogEntry>;
}

/// Sessions, participant bindings, and the append-only action log.
///
/// Each table is its own lock so reads of one don't contend with writes to
/// another; the arbiter's per-session mutex (see [`crate::locks`]) is what
/// actually serializes the read-modify-write sequence of a single
/// submission across these tables.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    participants: RwLock<HashMap<SessionId, Vec<ParticipantBinding>>>,
    log: RwLock<HashMap<SessionId, Vec<ActionLogEntry>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert_session(&self, session: Session, bindings: Vec<ParticipantBinding>) {
        let session_id = session.session_id.clone();
        self.sessions.write().await.insert(session_id.clone(), session);
        self.participants.write().await.insert(session_id.clone(), bindings);
        self.log.write().await.insert(session_id, Vec::new());
    }

    async fn get_session(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn put_session(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session);
    }

    async fn bindings(&self, session_id: &SessionId) -> Vec<ParticipantBinding> {
        self.participants
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn binding_for(
        &self,
        session_id: &SessionId,
        agent_id: &AgentId,
    ) -> Option<ParticipantBinding> {
        self.bindings(session_id)
            .await
            .into_iter()
            .find(|b| &b.agent_id == agent_id)
    }

    async fn add_binding(&self, binding: ParticipantBinding) {
        self.participants
            .write()
            .await
            .entry(binding.session_id.clone())
            .or_default()
            .push(binding);
    }

    async fn sessions_for_agent(&self, agent_id: &AgentId) -> Vec<Session> {
        let participants = self.participants.read().await;
        let sessions = self.sessions.read().await;
        let mut result: Vec<Session> = participants
            .iter()
            .filter(|(_, bindings)| bindings.iter().any(|b| &b.agent_id == agent_id))
            .filter_map(|(session_id, _)| sessions.get(session_id).cloned())
            .collect();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        result
    }

    async fn append_log_entry(&self, entry: ActionLogEntry) {
        self.log
            .write()
            .await
            .entry(entry.session_id.clone())
            .or_default()
            .push(entry);
    }

    async fn log_for(&self, session_id: &SessionId) -> Vec<ActionLogEntry> {
        self.log.read().await.get(session_id).cloned().unwrap_or_default()
    }
}
