use crate::board::{Board, Move, PieceKind, Side, Square};
use crate::rules;

pub const DEFAULT_DEPTH: u32 = 3;

// score assigned to a side that has no legal move (loss for the side to move)
const LOSS_SCORE: i32 = 100_000;

const fn base_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::General => 10_000,
        PieceKind::Chariot => 1_000,
        PieceKind::Cannon => 450,
        PieceKind::Horse => 400,
        PieceKind::Elephant => 20,
        PieceKind::Advisor => 20,
        PieceKind::Soldier => 10,
    }
}

// Positional terms, mirrored per side so the same formula applies to both:
// soldiers gain for advancing past the river, cannons like the central
// column, horses dislike the edge files.
fn position_bonus(kind: PieceKind, side: Side, square: Square) -> i32 {
    let normalized_row = match side {
        Side::Black => square.row as i32,
        Side::Red => 9 - square.row as i32,
    };
    match kind {
        PieceKind::Soldier => {
            if normalized_row > 4 {
                20 + (normalized_row - 4) * 10
            } else {
                0
            }
        }
        PieceKind::Cannon => {
            if square.col == 4 {
                20
            } else {
                0
            }
        }
        PieceKind::Horse => {
            if square.col == 0 || square.col == 8 {
                -10
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Material plus positional score from `perspective`'s point of view.
pub fn evaluate(board: &Board, perspective: Side) -> i32 {
    let mut score = 0;
    for (square, piece) in board.iter_pieces() {
        let value = base_value(piece.kind) + position_bonus(piece.kind, piece.side, square);
        if piece.side == perspective {
            score += value;
        } else {
            score -= value;
        }
    }
    score
}

pub struct Engine {
    depth: u32,
}

impl Engine {
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }

    /// Best move for `side` with its score, or None when `side` has no
    /// legal move (the game is already lost for it).
    pub fn best_move(&self, board: &Board, side: Side) -> Option<(Move, i32)> {
        let (score, move_) = self.minimax(board, self.depth, i32::MIN, i32::MAX, true, side);
        move_.map(|move_| (move_, score))
    }

    // Fixed-depth minimax with alpha-beta pruning. Leaves are evaluated from
    // the perspective of the side that made the root call, which is `side`
    // when maximizing and its opponent when minimizing.
    fn minimax(
        &self,
        board: &Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        side: Side,
    ) -> (i32, Option<Move>) {
        if depth == 0 {
            let root_side = if maximizing { side } else { side.opponent() };
            return (evaluate(board, root_side), None);
        }

        // no legal move: the side to move here has lost
        if !rules::has_any_legal_move(board, side) {
            return (if maximizing { -LOSS_SCORE } else { LOSS_SCORE }, None);
        }

        let mut best_move = None;
        if maximizing {
            let mut max_score = i32::MIN;
            for move_ in rules::all_legal_moves(board, side) {
                let next = board.apply(move_);
                let (score, _) =
                    self.minimax(&next, depth - 1, alpha, beta, false, side.opponent());
                if score > max_score {
                    max_score = score;
                    best_move = Some(move_);
                }
                alpha = alpha.max(score);
                if beta <= alpha {
                    break;
                }
            }
            (max_score, best_move)
        } else {
            let mut min_score = i32::MAX;
            for move_ in rules::all_legal_moves(board, side) {
                let next = board.apply(move_);
                let (score, _) =
                    self.minimax(&next, depth - 1, alpha, beta, true, side.opponent());
                if score < min_score {
                    min_score = score;
                    best_move = Some(move_);
                }
                beta = beta.min(score);
                if beta <= alpha {
                    break;
                }
            }
            (min_score, best_move)
        }
    }
}
