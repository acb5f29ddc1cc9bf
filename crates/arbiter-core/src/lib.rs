//! Deterministic rules shared by the coordination engine and its templates.
//!
//! `arbiter-core` defines the canonical data model (agents, sessions,
//! participants, the action log) and the state-machine contract every game
//! template satisfies. Nothing in this crate performs I/O: persistence,
//! locking, and notification live in `arbiter-runtime`.
pub mod error;
pub mod identity;
pub mod session;
pub mod template;

pub use error::{ArbiterError, ErrorKind, TemplateError};
pub use identity::{Agent, AgentId, SecretGenerator};
pub use session::{ActionLogEntry, ParticipantBinding, Session, SessionId, SessionStatus, Tick};
pub use template::{StateDoc, Template, TemplateRegistry};
