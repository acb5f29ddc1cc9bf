//! The concrete, I/O-performing half of the coordination engine.
//!
//! `arbiter-core` defines the rules; this crate supplies everything it
//! deliberately leaves out: in-memory identity and session stores, the
//! per-session lock map, best-effort change notification, CSPRNG-backed
//! secret generation, and the [`Arbiter`] that wires all of it into the
//! single operation described in §4.6 of the coordination spec.
//!
//! Nothing here is transport-specific: there is no HTTP handler, no
//! serialization to wire bytes. A transport adapter sits directly on top of
//! [`Arbiter`]'s methods and the request/response shapes in [`types`].

pub mod arbiter;
pub mod config;
pub mod identity_store;
pub mod locks;
pub mod notifier;
pub mod secret;
pub mod session_store;
pub mod types;

pub use arbiter::Arbiter;
pub use config::ArbiterConfig;
pub use identity_store::{IdentityStore, InMemoryIdentityStore};
pub use locks::SessionLocks;
pub use notifier::{ChangeEvent, ChangeNotifier};
pub use secret::RandomSecretGenerator;
pub use session_store::{InMemorySessionStore, SessionStore};
pub use types::{
    CreateSessionOutcome, JoinSessionOutcome, Participants, SessionSummary, SessionView,
    SubmitActionOutcome,
};
