use engine::{Grid, GridGame};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BOARD_SIZE: usize = 15;
pub const WIN_LENGTH: usize = 5;

const AXES: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stone {
    Black,
    White,
}

impl Stone {
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    Rejected,
    Placed,
    Won(Stone),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GomokuSnapshot {
    pub board: Vec<Vec<Option<Stone>>>,
    pub to_move: Stone,
    pub winner: Option<Stone>,
    pub last_move: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gomoku {
    board: Grid<Option<Stone>>,
    to_move: Stone,
    winner: Option<Stone>,
    last_move: Option<(usize, usize)>,
}

impl Default for Gomoku {
    fn default() -> Self {
        Self::new()
    }
}

impl Gomoku {
    pub fn new() -> Self {
        Self {
            board: Grid::filled(BOARD_SIZE, BOARD_SIZE, None),
            to_move: Stone::Black,
            winner: None,
            last_move: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn board(&self) -> &Grid<Option<Stone>> {
        &self.board
    }

    pub fn to_move(&self) -> Stone {
        self.to_move
    }

    pub fn winner(&self) -> Option<Stone> {
        self.winner
    }

    pub fn stone_at(&self, row: usize, col: usize) -> Option<Stone> {
        self.board.get(row, col).copied().flatten()
    }

    pub fn place(&mut self, row: usize, col: usize) -> PlaceOutcome {
        if self.winner.is_some() {
            return PlaceOutcome::Rejected;
        }
        match self.board.get(row, col) {
            Some(None) => {}
            _ => return PlaceOutcome::Rejected,
        }

        let player = self.to_move;
        self.board.set(row, col, Some(player));
        self.last_move = Some((row, col));

        if self.has_five_through(row, col, player) {
            debug!(?player, row, col, "gomoku won");
            self.winner = Some(player);
            return PlaceOutcome::Won(player);
        }

        self.to_move = player.opponent();
        PlaceOutcome::Placed
    }

    fn has_five_through(&self, row: usize, col: usize, player: Stone) -> bool {
        AXES.iter().any(|&(dr, dc)| {
            let count = 1
                + self.run_length(row, col, dr, dc, player)
                + self.run_length(row, col, -dr, -dc, player);
            count >= WIN_LENGTH
        })
    }

    fn run_length(&self, row: usize, col: usize, dr: i32, dc: i32, player: Stone) -> usize {
        let mut count = 0;
        for i in 1..WIN_LENGTH as i32 {
            let r = row as i32 + dr * i;
            let c = col as i32 + dc * i;
            if !self.board.contains(r, c) || self.board[(r as usize, c as usize)] != Some(player) {
                break;
            }
            count += 1;
        }
        count
    }
}

impl GridGame for Gomoku {
    type Input = (usize, usize);
    type Snapshot = GomokuSnapshot;

    fn apply_input(&mut self, (row, col): (usize, usize)) -> bool {
        self.place(row, col) != PlaceOutcome::Rejected
    }

    fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    fn snapshot(&self) -> GomokuSnapshot {
        GomokuSnapshot {
            board: self.board.rows().map(|row| row.to_vec()).collect(),
            to_move: self.to_move,
            winner: self.winner,
            last_move: self.last_move,
        }
    }
}
