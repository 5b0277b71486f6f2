use std::time::Duration;

use engine::{Grid, GridGame, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PUZZLE_SIZE: usize = 3;
pub const TICK: Duration = Duration::from_secs(1);

/// Tile `id` belongs at row `id / PUZZLE_SIZE`, column `id % PUZZLE_SIZE`.
pub fn correct_position(id: u8) -> (usize, usize) {
    let id = id as usize;
    (id / PUZZLE_SIZE, id % PUZZLE_SIZE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSnapshot {
    pub tiles: Vec<Vec<u8>>,
    pub selected: Option<(usize, usize)>,
    pub moves: u32,
    #[serde(with = "crate::serde_duration")]
    pub elapsed: Duration,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapPuzzle {
    tiles: Grid<u8>,
    selected: Option<(usize, usize)>,
    moves: u32,
    #[serde(with = "crate::serde_duration")]
    elapsed: Duration,
}

impl SwapPuzzle {
    pub fn new(seed: u64) -> Self {
        let mut ids: Vec<u8> = (0..(PUZZLE_SIZE * PUZZLE_SIZE) as u8).collect();
        Rng::new(seed).shuffle(&mut ids);
        Self::from_tiles(Grid::from_fn(PUZZLE_SIZE, PUZZLE_SIZE, |row, col| {
            ids[row * PUZZLE_SIZE + col]
        }))
    }

    pub fn from_tiles(tiles: Grid<u8>) -> Self {
        Self {
            tiles,
            selected: None,
            moves: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn tiles(&self) -> &Grid<u8> {
        &self.tiles
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// `mm:ss`.
    pub fn elapsed_label(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn selected(&self) -> Option<(usize, usize)> {
        self.selected
    }

    pub fn is_completed(&self) -> bool {
        self.tiles
            .iter()
            .all(|(row, col, &id)| correct_position(id) == (row, col))
    }

    /// Second click swaps with the first, even when both are the same tile.
    pub fn click(&mut self, row: usize, col: usize) -> bool {
        if self.is_completed() || self.tiles.get(row, col).is_none() {
            return false;
        }
        match self.selected.take() {
            None => self.selected = Some((row, col)),
            Some(first) => {
                self.tiles.swap(first, (row, col));
                self.moves += 1;
                if self.is_completed() {
                    debug!(moves = self.moves, elapsed = %self.elapsed_label(), "puzzle solved");
                }
            }
        }
        true
    }

    pub fn advance_clock(&mut self) {
        if !self.is_completed() {
            self.elapsed += TICK;
        }
    }
}

impl GridGame for SwapPuzzle {
    type Input = (usize, usize);
    type Snapshot = PuzzleSnapshot;

    fn apply_input(&mut self, (row, col): (usize, usize)) -> bool {
        self.click(row, col)
    }

    fn tick(&mut self) {
        self.advance_clock();
    }

    fn is_over(&self) -> bool {
        self.is_completed()
    }

    fn snapshot(&self) -> PuzzleSnapshot {
        PuzzleSnapshot {
            tiles: self.tiles.rows().map(|row| row.to_vec()).collect(),
            selected: self.selected,
            moves: self.moves,
            elapsed: self.elapsed,
            completed: self.is_completed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_swap_from_solved() -> SwapPuzzle {
        let mut tiles = Grid::from_fn(PUZZLE_SIZE, PUZZLE_SIZE, |row, col| {
            (row * PUZZLE_SIZE + col) as u8
        });
        tiles.swap((0, 0), (2, 2));
        SwapPuzzle::from_tiles(tiles)
    }

    #[test]
    fn swapping_the_misplaced_pair_completes() {
        let mut puzzle = one_swap_from_solved();
        assert!(!puzzle.is_completed());
        assert!(puzzle.click(0, 0));
        assert!(puzzle.click(2, 2));
        assert!(puzzle.is_completed());
        assert_eq!(puzzle.moves(), 1);
        assert!(!puzzle.click(1, 1));
    }

    #[test]
    fn same_tile_twice_counts_a_move() {
        let mut puzzle = one_swap_from_solved();
        puzzle.click(1, 1);
        puzzle.click(1, 1);
        assert_eq!(puzzle.moves(), 1);
        assert_eq!(puzzle.selected(), None);
        assert_eq!(puzzle.tiles()[(1, 1)], 4);
    }

    #[test]
    fn clock_stops_once_solved() {
        let mut puzzle = one_swap_from_solved();
        for _ in 0..65 {
            puzzle.advance_clock();
        }
        assert_eq!(puzzle.elapsed_label(), "01:05");
        puzzle.click(0, 0);
        puzzle.click(2, 2);
        puzzle.advance_clock();
        assert_eq!(puzzle.elapsed(), Duration::from_secs(65));
    }

    #[test]
    fn shuffle_keeps_every_tile() {
        let puzzle = SwapPuzzle::new(11);
        let mut ids: Vec<u8> = puzzle.tiles().iter().map(|(_, _, id)| *id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..9).collect::<Vec<u8>>());
    }
}
