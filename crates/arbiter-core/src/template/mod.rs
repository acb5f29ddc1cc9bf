//! The state-machine contract (§4.3) and its two concrete templates.

pub mod chess;
pub mod registry;
pub mod rps;

pub use registry::TemplateRegistry;

use crate::error::TemplateError;

/// A game's authoritative position, dispatched on which template owns it.
///
/// Session state and action payloads are untyped documents in the
/// specification; here that's expressed as a tagged enum rather than an
/// inheritance hierarchy, with one variant per registered template version.
/// (De)serialization to the persisted opaque document happens at the store
/// boundary — the arbiter and templates only ever see this enum.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "template", rename_all = "snake_case"))]
pub enum StateDoc {
    RpsV1(rps::RpsState),
    ChessV1(chess::ChessState),
}

/// The capability set every game template satisfies.
///
/// All operations are pure and side-effect-free: same input always produces
/// the same output, nothing here performs I/O, and `apply_action` never
/// mutates its input. This is a trait object contract (`Arc<dyn Template>`
/// in the registry), not an inheritance hierarchy, mirroring how the
/// teacher crate resolves map/item/table generation through oracle traits.
pub trait Template: Send + Sync {
    /// Stable string identifying this template version; matches the
    /// registry key it is registered under.
    fn template_id(&self) -> &'static str;

    /// The fixed, ordered set of role names this template declares.
    fn roles(&self) -> &'static [&'static str];

    /// The deterministic starting position for a fresh session.
    fn initial_state(&self) -> StateDoc;

    /// The actions `role` may submit in `state`. Empty iff `role` cannot act
    /// right now. Order is not semantically meaningful but must be stable.
    fn legal_actions(&self, state: &StateDoc, role: &str) -> Vec<String>;

    /// Applies `action` as submitted by `role`, returning the successor
    /// state. Fails if `action` is not in `legal_actions(state, role)`.
    fn apply_action(
        &self,
        state: &StateDoc,
        role: &str,
        action: &str,
    ) -> Result<StateDoc, TemplateError>;

    /// True iff no role has any legal action in this state.
    fn is_terminal(&self, state: &StateDoc) -> bool;

    /// Returns `state` with information hidden from `role` masked out.
    /// Idempotent: applying it twice is the same as applying it once.
    fn view_state(&self, state: &StateDoc, role: &str) -> StateDoc;
}
