//! Agent identity: the data model for §4.1 of the coordination spec.
//!
//! Secret generation itself is treated as an external collaborator — the
//! same way the teacher crate keeps map/item/table generation behind oracle
//! traits instead of inlining it into the engine. Implementations live in
//! `arbiter-runtime`.

use core::fmt;

/// Opaque, globally-unique identifier for a registered agent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable identity, authorized by an opaque bearer secret.
///
/// Agents are never deleted once registered. The `bearer_secret` is the only
/// value that lets a requester act as this agent; it is `None` until the
/// agent completes the claim step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub agent_id: AgentId,
    /// Present once the agent has been claimed; `None` while unclaimed.
    pub bearer_secret: Option<String>,
    /// One-time token exchanged for a bearer secret; invalidated on claim.
    pub claim_secret: Option<String>,
    pub claimed: bool,
    #[cfg_attr(feature = "serde", serde(with = "chrono::serde::ts_seconds"))]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Agent {
    /// Constructs a freshly-registered, unclaimed agent.
    pub fn unclaimed(
        agent_id: AgentId,
        claim_secret: String,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            agent_id,
            bearer_secret: None,
            claim_secret: Some(claim_secret),
            claimed: false,
            created_at,
        }
    }
}

/// Generates cryptographically random, unguessable secret strings.
///
/// The core never generates secrets itself — this is the "opaque
/// secret-string generator" the specification treats as an external
/// collaborator. `arbiter-runtime` provides a CSPRNG-backed implementation.
pub trait SecretGenerator: Send + Sync {
    /// Generates a new secret, unique with overwhelming probability.
    fn generate(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclaimed_agent_has_no_bearer_secret() {
        let agent = Agent::unclaimed(
            AgentId::new("agent-1"),
            "claim-abc".to_string(),
            chrono::Utc::now(),
        );
        assert!(agent.bearer_secret.is_none());
        assert_eq!(agent.claim_secret.as_deref(), Some("claim-abc"));
        assert!(!agent.claimed);
    }
}
