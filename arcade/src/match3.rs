use std::collections::BTreeSet;

use engine::{Grid, GridGame, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BOARD_SIZE: usize = 8;
pub const STARTING_MOVES: u32 = 30;
pub const POINTS_PER_GEM: u32 = 10;
pub const MIN_RUN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gem {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl Gem {
    pub const ALL: [Gem; 6] = [
        Gem::Red,
        Gem::Blue,
        Gem::Green,
        Gem::Yellow,
        Gem::Purple,
        Gem::Orange,
    ];

    pub fn letter(self) -> char {
        match self {
            Gem::Red => 'R',
            Gem::Blue => 'B',
            Gem::Green => 'G',
            Gem::Yellow => 'Y',
            Gem::Purple => 'P',
            Gem::Orange => 'O',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Rejected,
    /// Move consumed; `cleared` distinct cells were matched and refilled.
    Swapped { cleared: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match3Snapshot {
    pub board: Vec<Vec<Gem>>,
    pub selected: Option<(usize, usize)>,
    pub score: u32,
    pub moves_left: u32,
    pub game_over: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match3 {
    board: Grid<Gem>,
    rng: Rng,
    selected: Option<(usize, usize)>,
    score: u32,
    moves_left: u32,
}

impl Match3 {
    pub fn new(seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let board = Grid::from_fn(BOARD_SIZE, BOARD_SIZE, |_, _| random_gem(&mut rng));
        Self::with_board(board, rng)
    }

    pub fn with_board(board: Grid<Gem>, rng: Rng) -> Self {
        Self {
            board,
            rng,
            selected: None,
            score: 0,
            moves_left: STARTING_MOVES,
        }
    }

    pub fn board(&self) -> &Grid<Gem> {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn selected(&self) -> Option<(usize, usize)> {
        self.selected
    }

    pub fn is_game_over(&self) -> bool {
        self.moves_left == 0
    }

    /// First click selects; a click next to the selection swaps; any other
    /// click moves the selection.
    pub fn click(&mut self, row: usize, col: usize) -> bool {
        if self.is_game_over() || self.board.get(row, col).is_none() {
            return false;
        }
        match self.selected {
            Some(from) if is_adjacent(from, (row, col)) => {
                self.selected = None;
                self.swap(from, (row, col));
            }
            _ => self.selected = Some((row, col)),
        }
        true
    }

    pub fn swap(&mut self, a: (usize, usize), b: (usize, usize)) -> SwapOutcome {
        if self.is_game_over()
            || !is_adjacent(a, b)
            || self.board.get(a.0, a.1).is_none()
            || self.board.get(b.0, b.1).is_none()
        {
            return SwapOutcome::Rejected;
        }

        self.board.swap(a, b);
        self.moves_left -= 1;

        let windows = run_windows(&self.board);
        let matched: BTreeSet<(usize, usize)> = windows.iter().flatten().copied().collect();
        for &(row, col) in &matched {
            let gem = random_gem(&mut self.rng);
            self.board.set(row, col, gem);
        }
        // Each window scores all of its cells, so a run of four counts six.
        self.score += (windows.len() * MIN_RUN) as u32 * POINTS_PER_GEM;

        if self.is_game_over() {
            debug!(score = self.score, "match3 out of moves");
        }
        SwapOutcome::Swapped {
            cleared: matched.len(),
        }
    }
}

fn random_gem(rng: &mut Rng) -> Gem {
    Gem::ALL[rng.below(Gem::ALL.len())]
}

fn is_adjacent(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1) == 1
}

/// Every three-wide window of identical gems, rows first. A run of four
/// yields two overlapping windows.
pub fn run_windows(board: &Grid<Gem>) -> Vec<[(usize, usize); MIN_RUN]> {
    let mut windows = Vec::new();
    for row in 0..board.height() {
        for col in 0..board.width() {
            let gem = board[(row, col)];
            if col + MIN_RUN <= board.width()
                && (1..MIN_RUN).all(|k| board[(row, col + k)] == gem)
            {
                windows.push(std::array::from_fn(|k| (row, col + k)));
            }
            if row + MIN_RUN <= board.height()
                && (1..MIN_RUN).all(|k| board[(row + k, col)] == gem)
            {
                windows.push(std::array::from_fn(|k| (row + k, col)));
            }
        }
    }
    windows
}

/// Every cell that belongs to a horizontal or vertical run of three or more.
pub fn find_matches(board: &Grid<Gem>) -> BTreeSet<(usize, usize)> {
    run_windows(board).into_iter().flatten().collect()
}

impl GridGame for Match3 {
    type Input = (usize, usize);
    type Snapshot = Match3Snapshot;

    fn apply_input(&mut self, (row, col): (usize, usize)) -> bool {
        self.click(row, col)
    }

    fn is_over(&self) -> bool {
        self.is_game_over()
    }

    fn snapshot(&self) -> Match3Snapshot {
        Match3Snapshot {
            board: self.board.rows().map(|row| row.to_vec()).collect(),
            selected: self.selected,
            score: self.score,
            moves_left: self.moves_left,
            game_over: self.is_game_over(),
        }
    }
}
