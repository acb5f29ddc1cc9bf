//! The sequential template: chess, driven by an external legality oracle.
//!
//! The template itself knows nothing about chess rules beyond the mapping
//! `oracle(position, move) -> legal? | new position | terminal?`; move
//! generation and legality are delegated entirely to the `chess` crate, the
//! same way the source delegates to an existing chess library.

use core::str::FromStr;

use chess::{Board, ChessMove, Color, MoveGen, Piece, Square};

use super::{StateDoc, Template};
use crate::error::TemplateError;

const TEMPLATE_ID: &str = "chess.v1";
const ROLES: [&str; 2] = ["white", "black"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChessOutcome {
    WhiteWins,
    BlackWins,
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl Side {
    fn as_role(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChessState {
    /// FEN of the current position.
    pub position: String,
    pub turn: Side,
    pub outcome: Option<ChessOutcome>,
}

impl ChessState {
    fn board(&self) -> Option<Board> {
        Board::from_str(&self.position).ok()
    }
}

fn uci(mv: ChessMove) -> String {
    let mut s = format!("{}{}", mv.get_source(), mv.get_dest());
    if let Some(promotion) = mv.get_promotion() {
        s.push(promotion_char(promotion));
    }
    s
}

fn promotion_char(piece: Piece) -> char {
    match piece {
        Piece::Queen => 'q',
        Piece::Rook => 'r',
        Piece::Bishop => 'b',
        Piece::Knight => 'n',
        _ => 'q',
    }
}

fn parse_uci(board: &Board, action: &str) -> Option<ChessMove> {
    if action.len() != 4 && action.len() != 5 {
        return None;
    }
    let source = Square::from_str(action.get(0..2)?).ok()?;
    let dest = Square::from_str(action.get(2..4)?).ok()?;
    let promotion = match action.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(Piece::Queen),
        Some(b'r') => Some(Piece::Rook),
        Some(b'b') => Some(Piece::Bishop),
        Some(b'n') => Some(Piece::Knight),
        _ => return None,
    };
    let mv = ChessMove::new(source, dest, promotion);
    MoveGen::new_legal(board).find(|legal| *legal == mv)
}

/// Conservative insufficient-material check: king-only or king-plus-one-minor
/// on each side. Does not special-case same-colour bishops or attempt a full
/// FIDE insufficient-material ruling — see DESIGN.md.
fn is_insufficient_material(board: &Board) -> bool {
    let has_major_or_pawn = (board.pieces(Piece::Pawn).0
        | board.pieces(Piece::Rook).0
        | board.pieces(Piece::Queen).0)
        != 0;
    if has_major_or_pawn {
        return false;
    }
    let minors = (board.pieces(Piece::Knight).0 | board.pieces(Piece::Bishop).0).count_ones();
    minors <= 1
}

/// The sequential template: strict turn alternation, legality delegated to
/// an external chess move generator.
#[derive(Default)]
pub struct ChessTemplate;

impl Template for ChessTemplate {
    fn template_id(&self) -> &'static str {
        TEMPLATE_ID
    }

    fn roles(&self) -> &'static [&'static str] {
        &ROLES
    }

    fn initial_state(&self) -> StateDoc {
        let board = Board::default();
        StateDoc::ChessV1(ChessState {
            position: board.to_string(),
            turn: Side::from(board.side_to_move()),
            outcome: None,
        })
    }

    fn legal_actions(&self, state: &StateDoc, role: &str) -> Vec<String> {
        let StateDoc::ChessV1(state) = state else {
            return Vec::new();
        };
        if state.outcome.is_some() || role != state.turn.as_role() {
            return Vec::new();
        }
        let Some(board) = state.board() else {
            return Vec::new();
        };
        MoveGen::new_legal(&board).map(uci).collect()
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
        let StateDoc::ChessV1(state) = state else {
            return Err(illegal());
        };
        if state.outcome.is_some() || role != state.turn.as_role() {
            return Err(illegal());
        }
        let board = state.board().ok_or_else(illegal)?;
        let mv = parse_uci(&board, action).ok_or_else(illegal)?;

        let next_board = board.make_move_new(mv);
        let outcome = match next_board.status() {
            chess::BoardStatus::Checkmate => Some(match next_board.side_to_move() {
                // The side to move after the winning move is the one in
                // checkmate, so the winner is the other side.
                Color::White => ChessOutcome::BlackWins,
                Color::Black => ChessOutcome::WhiteWins,
            }),
            chess::BoardStatus::Stalemate => Some(ChessOutcome::Draw),
            chess::BoardStatus::Ongoing if is_insufficient_material(&next_board) => {
                Some(ChessOutcome::Draw)
            }
            chess::BoardStatus::Ongoing => None,
        };

        Ok(StateDoc::ChessV1(ChessState {
            position: next_board.to_string(),
            turn: Side::from(next_board.side_to_move()),
            outcome,
        }))
    }

    fn is_terminal(&self, state: &StateDoc) -> bool {
        matches!(state, StateDoc::ChessV1(s) if s.outcome.is_some())
    }

    fn view_state(&self, state: &StateDoc, _role: &str) -> StateDoc {
        // Chess is perfect-information: the view is the identity function.
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ChessTemplate {
        ChessTemplate
    }

    #[test]
    fn initial_state_has_white_to_move() {
        let t = template();
        let state = t.initial_state();
        assert_eq!(t.legal_actions(&state, "black").len(), 0);
        assert_eq!(t.legal_actions(&state, "white").len(), 20);
    }

    #[test]
    fn out_of_turn_move_is_illegal() {
        let t = template();
        let state = t.initial_state();
        assert!(t.apply_action(&state, "black", "e7e5").is_err());
    }

    #[test]
    fn non_ascii_action_of_matching_byte_length_is_rejected_not_panicked() {
        let t = template();
        let state = t.initial_state();
        // "€e" is 4 bytes (a 3-byte char plus a 1-byte char) but only 2 chars;
        // byte offset 2 falls inside the multi-byte char, not on a boundary.
        assert!(t.apply_action(&state, "white", "\u{20ac}e").is_err());
        assert!(t.legal_actions(&state, "white").iter().all(|a| a != "\u{20ac}e"));
    }

    #[test]
    fn view_state_is_identity() {
        let t = template();
        let state = t.initial_state();
        assert_eq!(t.view_state(&state, "white"), state);
        assert_eq!(t.view_state(&state, "black"), state);
    }

    #[test]
    fn scholars_mate_ends_in_white_win() {
        let t = template();
        let moves = ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"];
        let mut state = t.initial_state();
        for (i, mv) in moves.iter().enumerate() {
            let role = if i % 2 == 0 { "white" } else { "black" };
            assert!(
                t.legal_actions(&state, role).iter().any(|a| a == mv),
                "{mv} should be legal for {role} at step {i}"
            );
            state = t.apply_action(&state, role, mv).unwrap();
        }
        assert!(t.is_terminal(&state));
        let StateDoc::ChessV1(final_state) = &state else {
            unreachable!()
        };
        assert_eq!(final_state.outcome, Some(ChessOutcome::WhiteWins));
    }
}
