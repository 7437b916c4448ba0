use crate::board::{Board, Move, Side};
use crate::rules;
use std::io::{Error, ErrorKind};

#[derive(Debug, Clone, Copy)]
pub enum Action {
    Play(Move),
    Undo,
    Reset,
}

/// Snapshot of a game in progress. States are immutable: `reduce` builds a
/// new state and keeps every past board in `history` for undo.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub turn: Side,
    pub winner: Option<Side>,
    pub in_check: bool,
    pub last_move: Option<Move>,
    history: Vec<Board>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::starting(),
            turn: Side::Red,
            winner: None,
            in_check: false,
            last_move: None,
            history: Vec::new(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn reduce(state: &GameState, action: Action) -> Result<GameState, Error> {
    match action {
        Action::Play(move_) => {
            if state.winner.is_some() {
                return Err(Error::new(ErrorKind::InvalidInput, "Game is already over"));
            }
            let piece = state
                .board
                .get(move_.from)
                .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "No piece on from-square"))?;
            if piece.side != state.turn {
                return Err(Error::new(ErrorKind::InvalidInput, "Not this side's turn"));
            }
            if !rules::legal_moves(&state.board, move_.from).contains(&move_.to) {
                return Err(Error::new(ErrorKind::InvalidInput, "Illegal move"));
            }

            let board = state.board.apply(move_);
            let next = state.turn.opponent();
            // no legal reply means the mover has won; there is no draw
            let winner = if rules::has_any_legal_move(&board, next) {
                None
            } else {
                Some(state.turn)
            };
            let in_check = rules::is_in_check(&board, next);
            let mut history = state.history.clone();
            history.push(state.board.clone());

            Ok(GameState {
                board,
                turn: next,
                winner,
                in_check,
                last_move: Some(move_),
                history,
            })
        }
        Action::Undo => {
            let mut history = state.history.clone();
            let board = history
                .pop()
                .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Nothing to undo"))?;
            let turn = state.turn.opponent();
            let in_check = rules::is_in_check(&board, turn);
            Ok(GameState {
                board,
                turn,
                winner: None,
                in_check,
                last_move: None,
                history,
            })
        }
        Action::Reset => Ok(GameState::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind, Square};

    fn mv(from: (usize, usize), to: (usize, usize)) -> Move {
        Move::new(Square::new(from.0, from.1), Square::new(to.0, to.1))
    }

    #[test]
    fn play_advances_the_turn() {
        let start = GameState::new();
        let next = reduce(&start, Action::Play(mv((6, 0), (5, 0)))).unwrap();

        assert_eq!(next.turn, Side::Black);
        assert_eq!(next.last_move, Some(mv((6, 0), (5, 0))));
        assert!(next.winner.is_none());
        assert!(!next.in_check);
        // the input state is a snapshot, not mutated
        assert_eq!(start, GameState::new());
    }

    #[test]
    fn illegal_actions_are_rejected() {
        let start = GameState::new();
        // empty from-square
        assert!(reduce(&start, Action::Play(mv((5, 0), (4, 0)))).is_err());
        // black piece on red's turn
        assert!(reduce(&start, Action::Play(mv((3, 0), (4, 0)))).is_err());
        // soldier cannot move sideways before the river
        assert!(reduce(&start, Action::Play(mv((6, 0), (6, 1)))).is_err());
        // nothing to undo at the start
        assert!(reduce(&start, Action::Undo).is_err());
    }

    #[test]
    fn undo_restores_the_previous_board() {
        let start = GameState::new();
        let after_red = reduce(&start, Action::Play(mv((6, 0), (5, 0)))).unwrap();
        let after_black = reduce(&after_red, Action::Play(mv((3, 0), (4, 0)))).unwrap();

        let undone = reduce(&after_black, Action::Undo).unwrap();
        assert_eq!(undone.board, after_red.board);
        assert_eq!(undone.turn, Side::Black);

        let undone_again = reduce(&undone, Action::Undo).unwrap();
        assert_eq!(undone_again.board, start.board);
        assert_eq!(undone_again.turn, Side::Red);
    }

    #[test]
    fn reset_returns_the_starting_state() {
        let start = GameState::new();
        let played = reduce(&start, Action::Play(mv((7, 1), (7, 4)))).unwrap();
        assert_eq!(reduce(&played, Action::Reset).unwrap(), GameState::new());
    }

    #[test]
    fn mating_move_declares_the_winner() {
        let mut board = Board::empty();
        for (row, col, kind, side) in [
            (0, 4, PieceKind::General, Side::Black),
            (0, 3, PieceKind::Soldier, Side::Black),
            (0, 5, PieceKind::Soldier, Side::Black),
            (8, 3, PieceKind::Chariot, Side::Red),
            (9, 4, PieceKind::General, Side::Red),
        ] {
            board.set(Square::new(row, col), Some(Piece::new(kind, side)));
        }
        let state = GameState {
            board,
            ..GameState::new()
        };

        let mated = reduce(&state, Action::Play(mv((8, 3), (8, 4)))).unwrap();
        assert_eq!(mated.winner, Some(Side::Red));
        assert!(mated.in_check);
        // no further play once the game is decided
        assert!(reduce(&mated, Action::Play(mv((0, 3), (0, 2)))).is_err());
    }
}
