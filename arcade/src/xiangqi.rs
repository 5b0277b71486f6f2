//! Chess-lite on a Xiangqi board.
//!
//! Each piece kind has a fixed geometric predicate and nothing else: there
//! are no palace bounds, no river, no horse-leg or elephant-eye blocking.
//! The only line-of-sight rules are the chariot's clear path and the
//! cannon's "screen iff capture".

use engine::{Grid, GridGame};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ROWS: usize = 10;
pub const COLS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Pawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessPiece {
    pub kind: PieceKind,
    pub side: Side,
}

impl ChessPiece {
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// Traditional glyph, used by text front ends.
    pub fn glyph(self) -> char {
        match (self.side, self.kind) {
            (Side::Red, PieceKind::King) => '帅',
            (Side::Red, PieceKind::Advisor) => '仕',
            (Side::Red, PieceKind::Elephant) => '相',
            (Side::Red, PieceKind::Pawn) => '兵',
            (Side::Black, PieceKind::King) => '将',
            (Side::Black, PieceKind::Advisor) => '士',
            (Side::Black, PieceKind::Elephant) => '象',
            (Side::Black, PieceKind::Pawn) => '卒',
            (_, PieceKind::Horse) => '马',
            (_, PieceKind::Chariot) => '车',
            (_, PieceKind::Cannon) => '炮',
        }
    }
}

const BACK_RANK: [PieceKind; COLS] = [
    PieceKind::Chariot,
    PieceKind::Horse,
    PieceKind::Elephant,
    PieceKind::Advisor,
    PieceKind::King,
    PieceKind::Advisor,
    PieceKind::Elephant,
    PieceKind::Horse,
    PieceKind::Chariot,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Illegal,
    Moved,
    Captured(PieceKind),
    KingCaptured(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Selected,
    Deselected,
    Move(MoveOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessSnapshot {
    pub board: Vec<Vec<Option<ChessPiece>>>,
    pub to_move: Side,
    pub selected: Option<(usize, usize)>,
    pub winner: Option<Side>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChessLite {
    board: Grid<Option<ChessPiece>>,
    to_move: Side,
    selected: Option<(usize, usize)>,
    winner: Option<Side>,
}

impl Default for ChessLite {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessLite {
    pub fn new() -> Self {
        Self::with_board(starting_board())
    }

    /// Red to move on an arbitrary position.
    pub fn with_board(board: Grid<Option<ChessPiece>>) -> Self {
        Self {
            board,
            to_move: Side::Red,
            selected: None,
            winner: None,
        }
    }

    pub fn empty() -> Self {
        Self::with_board(Grid::filled(COLS, ROWS, None))
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn board(&self) -> &Grid<Option<ChessPiece>> {
        &self.board
    }

    pub fn piece_at(&self, row: usize, col: usize) -> Option<ChessPiece> {
        self.board.get(row, col).copied().flatten()
    }

    pub fn put(&mut self, row: usize, col: usize, piece: Option<ChessPiece>) {
        self.board.set(row, col, piece);
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn selected(&self) -> Option<(usize, usize)> {
        self.selected
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Click semantics of the board: select an own piece, then any second
    /// click attempts the move and clears the selection.
    pub fn click(&mut self, row: usize, col: usize) -> ClickOutcome {
        if self.winner.is_some() || self.board.get(row, col).is_none() {
            return ClickOutcome::Ignored;
        }

        match self.selected.take() {
            Some(from) => match self.try_move(from, (row, col)) {
                MoveOutcome::Illegal => ClickOutcome::Deselected,
                outcome => ClickOutcome::Move(outcome),
            },
            None => match self.piece_at(row, col) {
                Some(piece) if piece.side == self.to_move => {
                    self.selected = Some((row, col));
                    ClickOutcome::Selected
                }
                _ => ClickOutcome::Ignored,
            },
        }
    }

    pub fn try_move(&mut self, from: (usize, usize), to: (usize, usize)) -> MoveOutcome {
        if self.winner.is_some() {
            return MoveOutcome::Illegal;
        }
        let Some(piece) = self.piece_at(from.0, from.1) else {
            return MoveOutcome::Illegal;
        };
        if piece.side != self.to_move || !self.can_move(from, to) {
            return MoveOutcome::Illegal;
        }

        let target = self.piece_at(to.0, to.1);
        self.board.set(to.0, to.1, Some(piece));
        self.board.set(from.0, from.1, None);

        match target {
            Some(captured) if captured.kind == PieceKind::King => {
                debug!(winner = ?piece.side, "king captured");
                self.winner = Some(piece.side);
                MoveOutcome::KingCaptured(piece.side)
            }
            Some(captured) => {
                self.to_move = self.to_move.opponent();
                MoveOutcome::Captured(captured.kind)
            }
            None => {
                self.to_move = self.to_move.opponent();
                MoveOutcome::Moved
            }
        }
    }

    /// Geometric legality only; does not consider whose turn it is.
    pub fn can_move(&self, from: (usize, usize), to: (usize, usize)) -> bool {
        let Some(piece) = self.piece_at(from.0, from.1) else {
            return false;
        };
        if self.board.get(to.0, to.1).is_none() {
            return false;
        }
        let target = self.piece_at(to.0, to.1);
        if target.is_some_and(|t| t.side == piece.side) {
            return false;
        }

        let dr = from.0.abs_diff(to.0);
        let dc = from.1.abs_diff(to.1);
        let straight = dr == 0 || dc == 0;

        match piece.kind {
            PieceKind::King | PieceKind::Pawn => dr + dc == 1,
            PieceKind::Advisor => dr == 1 && dc == 1,
            PieceKind::Elephant => dr == 2 && dc == 2,
            PieceKind::Horse => (dr == 2 && dc == 1) || (dr == 1 && dc == 2),
            PieceKind::Chariot => straight && !self.has_piece_between(from, to),
            PieceKind::Cannon => straight && self.has_piece_between(from, to) == target.is_some(),
        }
    }

    fn has_piece_between(&self, from: (usize, usize), to: (usize, usize)) -> bool {
        let step_r = (to.0 as i32 - from.0 as i32).signum();
        let step_c = (to.1 as i32 - from.1 as i32).signum();
        let mut r = from.0 as i32 + step_r;
        let mut c = from.1 as i32 + step_c;
        while (r, c) != (to.0 as i32, to.1 as i32) {
            if self.board[(r as usize, c as usize)].is_some() {
                return true;
            }
            r += step_r;
            c += step_c;
        }
        false
    }
}

impl GridGame for ChessLite {
    type Input = (usize, usize);
    type Snapshot = ChessSnapshot;

    fn apply_input(&mut self, (row, col): (usize, usize)) -> bool {
        self.click(row, col) != ClickOutcome::Ignored
    }

    fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    fn snapshot(&self) -> ChessSnapshot {
        ChessSnapshot {
            board: self.board.rows().map(|row| row.to_vec()).collect(),
            to_move: self.to_move,
            selected: self.selected,
            winner: self.winner,
        }
    }
}

pub fn starting_board() -> Grid<Option<ChessPiece>> {
    let mut board = Grid::filled(COLS, ROWS, None);
    for (side, back, cannon, pawn) in [(Side::Black, 0, 2, 3), (Side::Red, 9, 7, 6)] {
        for (col, kind) in BACK_RANK.iter().enumerate() {
            board.set(back, col, Some(ChessPiece::new(*kind, side)));
        }
        for col in [1, 7] {
            board.set(cannon, col, Some(ChessPiece::new(PieceKind::Cannon, side)));
        }
        for col in (0..COLS).step_by(2) {
            board.set(pawn, col, Some(ChessPiece::new(PieceKind::Pawn, side)));
        }
    }
    board
}
