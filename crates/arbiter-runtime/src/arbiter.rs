//! The arbiter: the engine described in §4.6, the one operation that
//! touches every invariant in the data model.

use std::sync::Arc;

use arbiter_core::{
    Agent, AgentId, ArbiterError, ParticipantBinding, Session, SessionId, SessionStatus,
    StateDoc, Tick,
};
use chrono::Utc;
use rand::RngCore;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use crate::config::ArbiterConfig;
use crate::identity_store::{IdentityStore, InMemoryIdentityStore};
use crate::notifier::{ChangeEvent, ChangeNotifier};
use crate::secret::RandomSecretGenerator;
use crate::session_store::{InMemorySessionStore, SessionStore};
use crate::types::{
    CreateSessionOutcome, JoinSessionOutcome, Participants, SessionSummary, SessionView,
    SubmitActionOutcome,
};

/// Whether a template requires an `expected_tick` optimistic-lock precondition
/// (§4.6 step 5). This classification lives in the runtime rather than in
/// `arbiter_core::Template` because it is a concurrency-shape concern of the
/// arbiter, not a capability of the state machine itself (§4.3 fixes that
/// contract at seven pure operations).
fn is_sequential(template_id: &str) -> bool {
    template_id == "chess.v1"
}

fn random_hex_id(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The coordination engine: binds identity to action, serializes concurrent
/// submissions against a session, enforces template-defined legality,
/// advances session state atomically with its audit log, and publishes
/// change events.
pub struct Arbiter {
    templates: arbiter_core::TemplateRegistry,
    identities: Arc<dyn IdentityStore>,
    sessions: Arc<dyn SessionStore>,
    locks: crate::locks::SessionLocks,
    notifier: ChangeNotifier,
    secrets: Arc<dyn arbiter_core::SecretGenerator>,
    config: ArbiterConfig,
}

impl Arbiter {
    /// Builds an arbiter over the default in-process stores. Use
    /// [`Arbiter::with_stores`] to wire in a durable-backed
    /// [`IdentityStore`]/[`SessionStore`] pair instead.
    pub fn new(config: ArbiterConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    /// Builds an arbiter over caller-supplied store implementations. The
    /// arbiter itself never depends on the in-memory stores directly — only
    /// on the [`IdentityStore`] and [`SessionStore`] traits — so a
    /// transactional key/row store per §6.2 can be substituted here without
    /// touching any other engine logic.
    pub fn with_stores(
        config: ArbiterConfig,
        identities: Arc<dyn IdentityStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            templates: arbiter_core::TemplateRegistry::with_defaults(),
            identities,
            sessions,
            locks: crate::locks::SessionLocks::new(),
            notifier: ChangeNotifier::new(config.change_channel_capacity),
            secrets: Arc::new(RandomSecretGenerator::new(config.secret_bytes)),
            config,
        }
    }

    // ---- Identity store (§4.1) ----------------------------------------

    pub async fn register_agent(&self) -> (AgentId, String) {
        let agent_id = AgentId::new(random_hex_id(self.config.agent_id_bytes));
        let claim_secret = self.secrets.generate();
        self.identities
            .insert(Agent::unclaimed(
                agent_id.clone(),
                claim_secret.clone(),
                Utc::now(),
            ))
            .await;
        (agent_id, claim_secret)
    }

    pub async fn claim_agent(
        &self,
        agent_id: &AgentId,
        claim_secret: &str,
    ) -> Result<String, ArbiterError> {
        let bearer_secret = self.secrets.generate();
        self.identities
            .claim(agent_id, claim_secret, bearer_secret.clone())
            .await?;
        Ok(bearer_secret)
    }

    pub async fn resolve_bearer(&self, bearer_secret: &str) -> Result<AgentId, ArbiterError> {
        self.identities
            .resolve(bearer_secret)
            .await
            .ok_or(ArbiterError::Unauthorized)
    }

    // ---- Session store (§4.5) ------------------------------------------

    pub async fn create_session(
        &self,
        caller: &AgentId,
        template_id: &str,
        participants: Participants,
    ) -> Result<CreateSessionOutcome, ArbiterError> {
        let template = self.templates.get(template_id)?;
        let roles = template.roles();

        if participants.len() != roles.len() || !roles.iter().all(|r| participants.contains_key(*r)) {
            return Err(ArbiterError::InvalidRequest(
                "participants must name exactly the template's role set".to_string(),
            ));
        }

        let mut assigned = Vec::new();
        for agent_id in participants.values().flatten() {
            if assigned.contains(agent_id) {
                return Err(ArbiterError::InvalidRequest(format!(
                    "agent {agent_id} is bound to more than one role"
                )));
            }
            if !self.identities.contains(agent_id).await {
                return Err(ArbiterError::AgentNotFound(agent_id.to_string()));
            }
            assigned.push(agent_id.clone());
        }

        if !assigned.contains(caller) {
            return Err(ArbiterError::CallerNotParticipant(caller.to_string()));
        }

        let status = if assigned.len() == roles.len() {
            SessionStatus::Active
        } else {
            SessionStatus::Waiting
        };

        let session_id = SessionId::new(random_hex_id(self.config.session_id_bytes));
        let now = Utc::now();
        let session = Session {
            session_id: session_id.clone(),
            template_id: template_id.to_string(),
            state: template.initial_state(),
            status,
            tick: Tick::ZERO,
            created_at: now,
            updated_at: now,
        };

        let bindings = participants
            .into_iter()
            .filter_map(|(role, agent_id)| {
                agent_id.map(|agent_id| ParticipantBinding {
                    session_id: session_id.clone(),
                    agent_id,
                    role,
                })
            })
            .collect();

        self.sessions.insert_session(session, bindings).await;

        Ok(CreateSessionOutcome {
            session_id,
            template_id: template_id.to_string(),
            status,
        })
    }

    pub async fn join_session(
        &self,
        session_id: &SessionId,
        agent_id: &AgentId,
        role: &str,
    ) -> Result<JoinSessionOutcome, ArbiterError> {
        let _guard = self.locks.lock(session_id).await;

        let mut session = self
            .sessions
            .get_session(session_id)
            .await
            .ok_or_else(|| ArbiterError::SessionNotFound(session_id.clone()))?;

        if session.status != SessionStatus::Waiting {
            return Err(ArbiterError::Forbidden {
                agent_id: agent_id.to_string(),
                session_id: session_id.clone(),
            });
        }

        let template = self.templates.get(&session.template_id)?;
        if !template.roles().contains(&role) {
            return Err(ArbiterError::InvalidRequest(format!(
                "unknown role {role:?} for template {:?}",
                session.template_id
            )));
        }

        let bindings = self.sessions.bindings(session_id).await;
        if bindings.iter().any(|b| b.role == role) {
            return Err(ArbiterError::RoleAlreadyBound(role.to_string()));
        }
        if bindings.iter().any(|b| &b.agent_id == agent_id) {
            return Err(ArbiterError::Forbidden {
                agent_id: agent_id.to_string(),
                session_id: session_id.clone(),
            });
        }

        self.sessions
            .add_binding(ParticipantBinding {
                session_id: session_id.clone(),
                agent_id: agent_id.clone(),
                role: role.to_string(),
            })
            .await;

        let bound_count = bindings.len() + 1;
        let became_active = bound_count == template.roles().len();
        if became_active {
            session.status = SessionStatus::Active;
        }
        session.updated_at = Utc::now();
        let status = session.status;
        self.sessions.put_session(session).await;

        drop(_guard);
        if became_active {
            self.notifier.publish(session_id.clone()).await;
        }

        Ok(JoinSessionOutcome {
            session_id: session_id.clone(),
            status,
        })
    }

    pub async fn read_session(
        &self,
        session_id: &SessionId,
        agent_id: &AgentId,
    ) -> Result<SessionView, ArbiterError> {
        let session = self
            .sessions
            .get_session(session_id)
            .await
            .ok_or_else(|| ArbiterError::SessionNotFound(session_id.clone()))?;
        let binding = self
            .sessions
            .binding_for(session_id, agent_id)
            .await
            .ok_or_else(|| ArbiterError::Forbidden {
                agent_id: agent_id.to_string(),
                session_id: session_id.clone(),
            })?;
        let template = self.templates.get(&session.template_id)?;
        let legal_actions = template.legal_actions(&session.state, &binding.role);
        let state = template.view_state(&session.state, &binding.role);

        Ok(SessionView {
            session_id: session.session_id,
            template_id: session.template_id,
            status: session.status,
            tick: session.tick,
            state,
            role: binding.role,
            legal_actions,
        })
    }

    pub async fn list_sessions(&self, agent_id: &AgentId) -> Vec<SessionSummary> {
        let sessions = self.sessions.sessions_for_agent(agent_id).await;
        let mut summaries = Vec::with_capacity(sessions.len());
        for session in sessions {
            let Some(binding) = self.sessions.binding_for(&session.session_id, agent_id).await
            else {
                continue;
            };
            summaries.push(SessionSummary {
                session_id: session.session_id,
                template_id: session.template_id,
                status: session.status,
                tick: session.tick,
                role: binding.role,
                updated_at: session.updated_at,
            });
        }
        summaries
    }

    pub async fn read_log(
        &self,
        session_id: &SessionId,
        agent_id: &AgentId,
    ) -> Result<Vec<arbiter_core::ActionLogEntry>, ArbiterError> {
        if self.sessions.get_session(session_id).await.is_none() {
            return Err(ArbiterError::SessionNotFound(session_id.clone()));
        }
        if self.sessions.binding_for(session_id, agent_id).await.is_none() {
            return Err(ArbiterError::Forbidden {
                agent_id: agent_id.to_string(),
                session_id: session_id.clone(),
            });
        }
        Ok(self.sessions.log_for(session_id).await)
    }

    /// Subscribes to change events for `session_id` (§4.7).
    pub async fn subscribe(&self, session_id: &SessionId) -> broadcast::Receiver<ChangeEvent> {
        self.notifier.subscribe(session_id).await
    }

    // ---- Arbiter (§4.6) -------------------------------------------------

    /// Accepts a submission `(agent, session_id, action, expected_tick?)`.
    /// Authenticates the bearer secret, serializes against the session's
    /// per-session lock, validates against the template, commits atomically,
    /// and publishes a change event.
    #[instrument(skip(self, bearer_secret, action), fields(session = %session_id))]
    pub async fn submit_action(
        &self,
        bearer_secret: &str,
        session_id: &SessionId,
        action: &str,
        expected_tick: Option<Tick>,
    ) -> Result<SubmitActionOutcome, ArbiterError> {
        // Step 1: authenticate.
        let agent_id = self.resolve_bearer(bearer_secret).await?;

        // Steps 2-8 run under the per-session exclusive lock.
        let guard = self.locks.lock(session_id).await;

        let session = self
            .sessions
            .get_session(session_id)
            .await
            .ok_or_else(|| ArbiterError::SessionNotFound(session_id.clone()))?;

        let binding = self
            .sessions
            .binding_for(session_id, &agent_id)
            .await
            .ok_or_else(|| ArbiterError::Forbidden {
                agent_id: agent_id.to_string(),
                session_id: session_id.clone(),
            })?;
        let role = binding.role;

        match session.status {
            SessionStatus::Completed => {
                debug!(%role, action, "rejected: session is terminal");
                return Err(ArbiterError::InvalidAction {
                    role,
                    action: action.to_string(),
                    reason: "terminal",
                });
            }
            SessionStatus::Waiting => {
                debug!(%role, action, "rejected: session has not started");
                return Err(ArbiterError::InvalidAction {
                    role,
                    action: action.to_string(),
                    reason: "not started",
                });
            }
            SessionStatus::Active => {}
        }

        let template = self.templates.get(&session.template_id)?;

        if is_sequential(&session.template_id) {
            let expected = expected_tick.ok_or_else(|| {
                ArbiterError::InvalidRequest(
                    "expected_tick is required for sequential templates".to_string(),
                )
            })?;
            if expected != session.tick {
                debug!(?expected, actual = %session.tick, "rejected: stale tick");
                return Err(ArbiterError::TickConflict {
                    session_id: session_id.clone(),
                    expected: Some(expected),
                    actual: session.tick,
                });
            }
        } else if template.legal_actions(&session.state, &role).is_empty() {
            debug!(%role, "rejected: already acted this phase");
            return Err(ArbiterError::AlreadyActed { role });
        }

        let legal_actions = template.legal_actions(&session.state, &role);
        if !legal_actions.iter().any(|a| a == action) {
            debug!(%role, action, "rejected: not a legal action");
            return Err(ArbiterError::InvalidAction {
                role,
                action: action.to_string(),
                reason: "not in legal_actions",
            });
        }

        let new_state = template.apply_action(&session.state, &role, action)?;

        let old_tick = session.tick;
        let new_tick = old_tick.next();
        let terminal = template.is_terminal(&new_state);
        let new_status = if terminal {
            SessionStatus::Completed
        } else {
            SessionStatus::Active
        };
        let now = Utc::now();

        self.sessions
            .put_session(Session {
                state: new_state.clone(),
                status: new_status,
                tick: new_tick,
                updated_at: now,
                ..session
            })
            .await;
        self.sessions
            .append_log_entry(arbiter_core::ActionLogEntry {
                entry_id: random_hex_id(16),
                session_id: session_id.clone(),
                agent_id,
                role: role.clone(),
                action: action.to_string(),
                tick: old_tick,
                created_at: now,
            })
            .await;

        drop(guard);
        self.notifier.publish(session_id.clone()).await;

        let view = template.view_state(&new_state, &role);
        Ok(SubmitActionOutcome {
            tick: new_tick,
            state: view,
            status: new_status,
        })
    }
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}
