//! The identity store contract (§4.1) and an in-memory implementation.
//!
//! The arbiter depends on the [`IdentityStore`] trait, not on
//! [`InMemoryIdentityStore`] directly — the same seam the teacher crate
//! draws between `StateRepository` and `InMemoryStateRepo`, so a
//! durable-backed implementation could be swapped in behind `Arc<dyn
//! IdentityStore>` without touching the arbiter.

use std::collections::HashMap;

use arbiter_core::{Agent, AgentId, ArbiterError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Agent rows and bearer-secret resolution, as used by [`crate::Arbiter`].
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Inserts a freshly-registered, unclaimed agent row.
    async fn insert(&self, agent: Agent);

    /// Atomically transitions an unclaimed agent to claimed, installing the
    /// given bearer secret. Fails with `Unauthorized` if the agent does not
    /// exist, is already claimed, or `claim_secret` does not match.
    async fn claim(
        &self,
        agent_id: &AgentId,
        claim_secret: &str,
        bearer_secret: String,
    ) -> Result<(), ArbiterError>;

    /// Resolves a bearer secret to the agent it authenticates, if any.
    async fn resolve(&self, bearer_secret: &str) -> Option<AgentId>;

    /// True iff `agent_id` has a row in the store (claimed or not).
    async fn contains(&self, agent_id: &AgentId) -> bool;
}

/// Holds agent rows and the secondary index from bearer secret to agent id.
///
/// Agents are never deleted once registered, so the only mutation paths are
/// insertion (register) and the single `unclaimed -> claimed` transition
/// (claim); both go through the same write lock.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    agents: RwLock<HashMap<AgentId, Agent>>,
    bearer_index: RwLock<HashMap<String, AgentId>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn insert(&self, agent: Agent) {
        self.agents.write().await.insert(agent.agent_id.clone(), agent);
    }

    async fn claim(
        &self,
        agent_id: &AgentId,
        claim_secret: &str,
        bearer_secret: String,
    ) -> Result<(), ArbiterError> {
        let mut agents = self.agents.write().await;
        let agent = agents.get_mut(agent_id).ok_or(ArbiterError::Unauthorized)?;
        if agent.claimed || agent.claim_secret.as_deref() != Some(claim_secret) {
            return Err(ArbiterError::Unauthorized);
        }
        agent.claimed = true;
        agent.claim_secret = None;
        agent.bearer_secret = Some(bearer_secret.clone());
        drop(agents);
        self.bearer_index
            .write()
            .await
            .insert(bearer_secret, agent_id.clone());
        Ok(())
    }

    async fn resolve(&self, bearer_secret: &str) -> Option<AgentId> {
        self.bearer_index.read().await.get(bearer_secret).cloned()
    }

    async fn contains(&self, agent_id: &AgentId) -> bool {
        self.agents.read().await.contains_key(agent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn claim_is_single_use() {
        let store = InMemoryIdentityStore::new();
        let agent_id = AgentId::new("agent-1");
        store
            .insert(Agent::unclaimed(
                agent_id.clone(),
                "claim-secret".to_string(),
                Utc::now(),
            ))
            .await;

        store
            .claim(&agent_id, "claim-secret", "bearer-1".to_string())
            .await
            .unwrap();
        assert_eq!(store.resolve("bearer-1").await, Some(agent_id.clone()));

        let second = store.claim(&agent_id, "claim-secret", "bearer-2".to_string()).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn resolve_returns_none_for_unknown_secret() {
        let store = InMemoryIdentityStore::new();
        assert_eq!(store.resolve("nonexistent").await, None);
    }
}
