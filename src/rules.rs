use crate::board::{Board, Move, PieceKind, Side, Square, COLS, ROWS};

// Horse offsets paired with the orthogonal leg square that can block them.
const HORSE_OFFSETS: [(i32, i32, i32, i32); 8] = [
    (-2, -1, -1, 0),
    (-2, 1, -1, 0),
    (2, -1, 1, 0),
    (2, 1, 1, 0),
    (-1, -2, 0, -1),
    (-1, 2, 0, 1),
    (1, -2, 0, -1),
    (1, 2, 0, 1),
];

const ORTHOGONAL: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Geometry- and obstruction-legal destinations for the piece at `from`,
/// ignoring check exposure. Empty when the square is empty.
pub fn potential_moves(board: &Board, from: Square) -> Vec<Square> {
    let piece = match board.get(from) {
        Some(piece) => piece,
        None => return Vec::new(),
    };
    let side = piece.side;
    let mut moves = Vec::new();

    // keep a destination only if it is empty or holds an enemy piece
    let try_add = |moves: &mut Vec<Square>, to: Square| {
        match board.get(to) {
            Some(target) if target.side == side => {}
            _ => moves.push(to),
        }
    };

    match piece.kind {
        PieceKind::General => {
            for (dr, dc) in ORTHOGONAL {
                if let Some(to) = from.offset(dr, dc) {
                    if to.in_palace(side) {
                        try_add(&mut moves, to);
                    }
                }
            }
        }
        PieceKind::Advisor => {
            for (dr, dc) in DIAGONAL {
                if let Some(to) = from.offset(dr, dc) {
                    if to.in_palace(side) {
                        try_add(&mut moves, to);
                    }
                }
            }
        }
        PieceKind::Elephant => {
            for (dr, dc) in DIAGONAL {
                if let Some(to) = from.offset(dr * 2, dc * 2) {
                    if to.across_river(side) {
                        continue;
                    }
                    // the intermediate "eye" square blocks the move
                    let eye = from.offset(dr, dc).unwrap_or(to);
                    if board.get(eye).is_none() {
                        try_add(&mut moves, to);
                    }
                }
            }
        }
        PieceKind::Horse => {
            for (dr, dc, leg_r, leg_c) in HORSE_OFFSETS {
                let leg = match from.offset(leg_r, leg_c) {
                    Some(leg) => leg,
                    None => continue,
                };
                // only the leg square blocks; destination occupancy never does
                if board.get(leg).is_some() {
                    continue;
                }
                if let Some(to) = from.offset(dr, dc) {
                    try_add(&mut moves, to);
                }
            }
        }
        PieceKind::Chariot => {
            for (dr, dc) in ORTHOGONAL {
                let mut i = 1;
                while let Some(to) = from.offset(dr * i, dc * i) {
                    match board.get(to) {
                        None => moves.push(to),
                        Some(target) => {
                            if target.side != side {
                                moves.push(to);
                            }
                            break;
                        }
                    }
                    i += 1;
                }
            }
        }
        PieceKind::Cannon => {
            for (dr, dc) in ORTHOGONAL {
                let mut screen_found = false;
                let mut i = 1;
                while let Some(to) = from.offset(dr * i, dc * i) {
                    match (screen_found, board.get(to)) {
                        (false, None) => moves.push(to),
                        (false, Some(_)) => screen_found = true,
                        // past the screen only a capture is possible
                        (true, None) => {}
                        (true, Some(target)) => {
                            if target.side != side {
                                moves.push(to);
                            }
                            break;
                        }
                    }
                    i += 1;
                }
            }
        }
        PieceKind::Soldier => {
            let forward = match side {
                Side::Red => -1,
                Side::Black => 1,
            };
            if let Some(to) = from.offset(forward, 0) {
                try_add(&mut moves, to);
            }
            if from.across_river(side) {
                for dc in [-1, 1] {
                    if let Some(to) = from.offset(0, dc) {
                        try_add(&mut moves, to);
                    }
                }
            }
        }
    }
    moves
}

/// Both generals on the same column with nothing between them.
pub fn is_flying_general(board: &Board) -> bool {
    let (red, black) = match (
        board.find_general(Side::Red),
        board.find_general(Side::Black),
    ) {
        (Some(red), Some(black)) => (red, black),
        _ => return false,
    };
    if red.col != black.col {
        return false;
    }
    for row in black.row + 1..red.row {
        if board.get(Square::new(row, red.col)).is_some() {
            return false;
        }
    }
    true
}

/// Whether `side`'s general is attacked. A missing general reports check
/// rather than failing on a malformed board.
pub fn is_in_check(board: &Board, side: Side) -> bool {
    let general = match board.find_general(side) {
        Some(square) => square,
        None => return true,
    };
    board
        .iter_pieces()
        .filter(|(_, piece)| piece.side != side)
        .any(|(square, _)| potential_moves(board, square).contains(&general))
}

/// Fully legal destinations for the piece at `from`: potential moves whose
/// resulting board neither exposes the mover's own general nor leaves the
/// generals facing each other.
pub fn legal_moves(board: &Board, from: Square) -> Vec<Square> {
    let piece = match board.get(from) {
        Some(piece) => piece,
        None => return Vec::new(),
    };
    potential_moves(board, from)
        .into_iter()
        .filter(|&to| {
            let next = board.apply(Move::new(from, to));
            !is_flying_general(&next) && !is_in_check(&next, piece.side)
        })
        .collect()
}

/// Every legal move for every piece of `side`, in row-major square order.
pub fn all_legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let mut moves = Vec::new();
    for row in 0..ROWS {
        for col in 0..COLS {
            let from = Square::new(row, col);
            match board.get(from) {
                Some(piece) if piece.side == side => {
                    moves.extend(
                        legal_moves(board, from)
                            .into_iter()
                            .map(|to| Move::new(from, to)),
                    );
                }
                _ => {}
            }
        }
    }
    moves
}

/// The engine's only terminal condition: a side with no legal move has lost.
pub fn has_any_legal_move(board: &Board, side: Side) -> bool {
    for row in 0..ROWS {
        for col in 0..COLS {
            let from = Square::new(row, col);
            match board.get(from) {
                Some(piece) if piece.side == side => {
                    if !legal_moves(board, from).is_empty() {
                        return true;
                    }
                }
                _ => {}
            }
        }
    }
    false
}
