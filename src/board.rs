use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::io::{Error, ErrorKind};

pub const ROWS: usize = 10;
pub const COLS: usize = 9;
// row 0 is black's back rank (top), row 9 is red's back rank (bottom)
// the river runs between rows 4 and 5

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Black,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    General,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Soldier,
}

impl PieceKind {
    /// Wire code used by the integer-grid board encoding (1..7).
    pub fn code(&self) -> i8 {
        match self {
            PieceKind::General => 1,
            PieceKind::Advisor => 2,
            PieceKind::Elephant => 3,
            PieceKind::Horse => 4,
            PieceKind::Chariot => 5,
            PieceKind::Cannon => 6,
            PieceKind::Soldier => 7,
        }
    }

    pub fn from_code(code: i8) -> Option<PieceKind> {
        match code {
            1 => Some(PieceKind::General),
            2 => Some(PieceKind::Advisor),
            3 => Some(PieceKind::Elephant),
            4 => Some(PieceKind::Horse),
            5 => Some(PieceKind::Chariot),
            6 => Some(PieceKind::Cannon),
            7 => Some(PieceKind::Soldier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset by (delta_row, delta_col), returning None when off the board.
    pub fn offset(&self, dr: i32, dc: i32) -> Option<Square> {
        let nr = self.row as i32 + dr;
        let nc = self.col as i32 + dc;
        if nr < 0 || nr >= ROWS as i32 || nc < 0 || nc >= COLS as i32 {
            return None;
        }
        Some(Square::new(nr as usize, nc as usize))
    }

    /// Palace: columns 3-5, rows 7-9 for red and 0-2 for black.
    pub fn in_palace(&self, side: Side) -> bool {
        if self.col < 3 || self.col > 5 {
            return false;
        }
        match side {
            Side::Red => self.row >= 7,
            Side::Black => self.row <= 2,
        }
    }

    /// Whether a piece of `side` standing here has crossed the river.
    pub fn across_river(&self, side: Side) -> bool {
        match side {
            Side::Red => self.row <= 4,
            Side::Black => self.row >= 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

lazy_static! {
    static ref STARTING_BOARD: Board = {
        use PieceKind::*;
        let back_rank = [
            Chariot, Horse, Elephant, Advisor, General, Advisor, Elephant, Horse, Chariot,
        ];
        let mut board = Board::empty();
        for (col, kind) in back_rank.into_iter().enumerate() {
            board.set(Square::new(0, col), Some(Piece::new(kind, Side::Black)));
            board.set(Square::new(9, col), Some(Piece::new(kind, Side::Red)));
        }
        for col in [1, 7] {
            board.set(Square::new(2, col), Some(Piece::new(Cannon, Side::Black)));
            board.set(Square::new(7, col), Some(Piece::new(Cannon, Side::Red)));
        }
        for col in [0, 2, 4, 6, 8] {
            board.set(Square::new(3, col), Some(Piece::new(Soldier, Side::Black)));
            board.set(Square::new(6, col), Some(Piece::new(Soldier, Side::Red)));
        }
        board
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; COLS]; ROWS],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    /// The standard 32-piece starting position.
    pub fn starting() -> Self {
        STARTING_BOARD.clone()
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.row][square.col]
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.cells[square.row][square.col] = piece;
    }

    pub fn iter_pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|piece| (Square::new(row, col), piece)))
        })
    }

    /// New board with the move applied; the input board is untouched.
    /// No legality checking here, that is the rules module's job.
    pub fn apply(&self, move_: Move) -> Board {
        let mut board = self.clone();
        board.cells[move_.to.row][move_.to.col] = board.cells[move_.from.row][move_.from.col];
        board.cells[move_.from.row][move_.from.col] = None;
        board
    }

    /// Integer-grid wire encoding: 0 empty, kind codes 1..7, positive red,
    /// negative black. Kept bit-compatible with the remote move service.
    pub fn to_grid(&self) -> [[i8; COLS]; ROWS] {
        let mut grid = [[0i8; COLS]; ROWS];
        for (square, piece) in self.iter_pieces() {
            let code = piece.kind.code();
            grid[square.row][square.col] = match piece.side {
                Side::Red => code,
                Side::Black => -code,
            };
        }
        grid
    }

    pub fn from_grid(grid: &[[i8; COLS]; ROWS]) -> Result<Board, Error> {
        let mut board = Board::empty();
        for (row, values) in grid.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                let side = if value > 0 { Side::Red } else { Side::Black };
                let kind = PieceKind::from_code(value.abs()).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidInput,
                        format!("Invalid piece code {} at ({}, {})", value, row, col),
                    )
                })?;
                board.set(Square::new(row, col), Some(Piece::new(kind, side)));
            }
        }
        Ok(board)
    }

    pub fn find_general(&self, side: Side) -> Option<Square> {
        // generals never leave columns 3-5
        for row in 0..ROWS {
            for col in 3..6 {
                let square = Square::new(row, col);
                if let Some(piece) = self.get(square) {
                    if piece.kind == PieceKind::General && piece.side == side {
                        return Some(square);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_layout() {
        let board = Board::starting();
        assert_eq!(
            board.get(Square::new(0, 4)),
            Some(Piece::new(PieceKind::General, Side::Black))
        );
        assert_eq!(
            board.get(Square::new(9, 4)),
            Some(Piece::new(PieceKind::General, Side::Red))
        );
        assert_eq!(
            board.get(Square::new(7, 1)),
            Some(Piece::new(PieceKind::Cannon, Side::Red))
        );
        assert_eq!(
            board.get(Square::new(3, 8)),
            Some(Piece::new(PieceKind::Soldier, Side::Black))
        );
        assert_eq!(board.get(Square::new(4, 4)), None);
        assert_eq!(board.iter_pieces().count(), 32);
    }

    #[test]
    fn apply_moves_exactly_one_piece() {
        let board = Board::starting();
        let move_ = Move::new(Square::new(9, 0), Square::new(8, 0));
        let next = board.apply(move_);

        assert_eq!(next.get(move_.from), None);
        assert_eq!(
            next.get(move_.to),
            Some(Piece::new(PieceKind::Chariot, Side::Red))
        );
        for row in 0..ROWS {
            for col in 0..COLS {
                let square = Square::new(row, col);
                if square != move_.from && square != move_.to {
                    assert_eq!(next.get(square), board.get(square));
                }
            }
        }
        // input board untouched
        assert_eq!(
            board.get(move_.from),
            Some(Piece::new(PieceKind::Chariot, Side::Red))
        );
    }

    #[test]
    fn grid_encoding_matches_wire_format() {
        let board = Board::starting();
        let grid = board.to_grid();
        assert_eq!(grid[0][0], -5); // black chariot
        assert_eq!(grid[0][4], -1); // black general
        assert_eq!(grid[2][1], -6); // black cannon
        assert_eq!(grid[6][0], 7); // red soldier
        assert_eq!(grid[9][4], 1); // red general
        assert_eq!(grid[5][5], 0);

        let decoded = Board::from_grid(&grid).unwrap();
        assert_eq!(decoded, board);
    }

    #[test]
    fn from_grid_rejects_bad_codes() {
        let mut grid = [[0i8; COLS]; ROWS];
        grid[4][4] = 8;
        assert!(Board::from_grid(&grid).is_err());
    }

    #[test]
    fn palace_and_river_geometry() {
        assert!(Square::new(9, 4).in_palace(Side::Red));
        assert!(Square::new(7, 3).in_palace(Side::Red));
        assert!(!Square::new(6, 4).in_palace(Side::Red));
        assert!(!Square::new(9, 2).in_palace(Side::Red));
        assert!(Square::new(0, 5).in_palace(Side::Black));
        assert!(!Square::new(3, 4).in_palace(Side::Black));

        assert!(Square::new(4, 0).across_river(Side::Red));
        assert!(!Square::new(5, 0).across_river(Side::Red));
        assert!(Square::new(5, 0).across_river(Side::Black));
        assert!(!Square::new(4, 0).across_river(Side::Black));
    }
}
