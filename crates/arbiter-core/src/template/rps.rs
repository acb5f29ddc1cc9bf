//! The simultaneous template: hidden-commit / reveal rock-paper-scissors.

use core::str::FromStr;

use super::{StateDoc, Template};
use crate::error::TemplateError;

const TEMPLATE_ID: &str = "rps.v1";
const ROLES: [&str; 2] = ["player_1", "player_2"];

/// A committed choice, also the wire representation of an RPS action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    /// Standard RPS beats-relation: `self` beats `other`.
    fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors)
                | (Choice::Scissors, Choice::Paper)
                | (Choice::Paper, Choice::Rock)
        )
    }
}

/// A per-role choice slot, including the `hidden` sentinel used only in
/// filtered views — the authoritative state never stores `Hidden`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChoiceSlot {
    Absent,
    Hidden,
    Revealed(Choice),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RpsPhase {
    Commit,
    Reveal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RpsOutcome {
    Player1Wins,
    Player2Wins,
    Draw,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RpsState {
    pub phase: RpsPhase,
    pub player_1: ChoiceSlot,
    pub player_2: ChoiceSlot,
    pub result: Option<RpsOutcome>,
}

impl RpsState {
    fn slot(&self, role: &str) -> Option<ChoiceSlot> {
        match role {
            "player_1" => Some(self.player_1),
            "player_2" => Some(self.player_2),
            _ => None,
        }
    }

    fn with_slot(&self, role: &str, slot: ChoiceSlot) -> RpsState {
        let mut next = self.clone();
        match role {
            "player_1" => next.player_1 = slot,
            "player_2" => next.player_2 = slot,
            _ => {}
        }
        next
    }
}

/// The simultaneous template: two symmetric players commit a choice, then
/// both choices are revealed and resolved by the standard beats-relation.
#[derive(Default)]
pub struct RpsTemplate;

impl Template for RpsTemplate {
    fn template_id(&self) -> &'static str {
        TEMPLATE_ID
    }

    fn roles(&self) -> &'static [&'static str] {
        &ROLES
    }

    fn initial_state(&self) -> StateDoc {
        StateDoc::RpsV1(RpsState {
            phase: RpsPhase::Commit,
            player_1: ChoiceSlot::Absent,
            player_2: ChoiceSlot::Absent,
            result: None,
        })
    }

    fn legal_actions(&self, state: &StateDoc, role: &str) -> Vec<String> {
        let StateDoc::RpsV1(state) = state else {
            return Vec::new();
        };
        let can_act = matches!(state.phase, RpsPhase::Commit)
            && matches!(state.slot(role), Some(ChoiceSlot::Absent));
        if can_act {
            vec![
                Choice::Rock.to_string(),
                Choice::Paper.to_string(),
                Choice::Scissors.to_string(),
            ]
        } else {
            Vec::new()
        }
    }

    fn apply_action(
        &self,
        state: &StateDoc,
        role: &str,
        action: &str,
    ) -> Result<StateDoc, TemplateError> {
        let illegal = || TemplateError::IllegalAction {
            role: role.to_string(),
            action: action.to_string(),
        };
        let StateDoc::RpsV1(state) = state else {
            return Err(illegal());
        };
        if !self
            .legal_actions(&StateDoc::RpsV1(state.clone()), role)
            .iter()
            .any(|a| a == action)
        {
            return Err(illegal());
        }
        let choice = Choice::from_str(action).map_err(|_| illegal())?;
        let mut next = state.with_slot(role, ChoiceSlot::Revealed(choice));

        if let (ChoiceSlot::Revealed(p1), ChoiceSlot::Revealed(p2)) =
            (next.player_1, next.player_2)
        {
            next.phase = RpsPhase::Reveal;
            next.result = Some(if p1 == p2 {
                RpsOutcome::Draw
            } else if p1.beats(p2) {
                RpsOutcome::Player1Wins
            } else {
                RpsOutcome::Player2Wins
            });
        }

        Ok(StateDoc::RpsV1(next))
    }

    fn is_terminal(&self, state: &StateDoc) -> bool {
        matches!(state, StateDoc::RpsV1(s) if s.result.is_some())
    }

    fn view_state(&self, state: &StateDoc, role: &str) -> StateDoc {
        let StateDoc::RpsV1(state) = state else {
            return state.clone();
        };
        if matches!(state.phase, RpsPhase::Reveal) {
            return StateDoc::RpsV1(state.clone());
        }
        let opponent = match role {
            "player_1" => "player_2",
            _ => "player_1",
        };
        let masked = match state.slot(opponent) {
            Some(ChoiceSlot::Revealed(_)) => ChoiceSlot::Hidden,
            Some(other) => other,
            None => ChoiceSlot::Absent,
        };
        StateDoc::RpsV1(state.with_slot(opponent, masked))
    }
}
