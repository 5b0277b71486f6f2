use std::time::Duration;

use engine::{Grid, GridGame, Rng, Vec2i};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
pub const SPAWN_POS: Vec2i = Vec2i::new(4, 0);
pub const CELL_EMPTY: u8 = 0;

const BASE_FALL_MS: u64 = 1_000;
const MIN_FALL_MS: u64 = 100;
const FALL_STEP_MS: u64 = 50;
const POINTS_PER_LINE: u32 = 100;
const LINES_PER_LEVEL: u32 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Piece {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Piece {
    pub const ALL: [Piece; 7] = [
        Piece::I,
        Piece::O,
        Piece::T,
        Piece::S,
        Piece::Z,
        Piece::J,
        Piece::L,
    ];

    /// Spawn orientation, rows top to bottom.
    pub fn shape(self) -> Vec<Vec<u8>> {
        let rows: &[&[u8]] = match self {
            Piece::I => &[&[1, 1, 1, 1]],
            Piece::O => &[&[1, 1], &[1, 1]],
            Piece::T => &[&[0, 1, 0], &[1, 1, 1]],
            Piece::S => &[&[0, 1, 1], &[1, 1, 0]],
            Piece::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Piece::J => &[&[1, 0, 0], &[1, 1, 1]],
            Piece::L => &[&[0, 0, 1], &[1, 1, 1]],
        };
        rows.iter().map(|row| row.to_vec()).collect()
    }

    /// Value written to the board when this piece lands. Never `CELL_EMPTY`.
    pub fn cell_value(self) -> u8 {
        match self {
            Piece::I => 1,
            Piece::O => 2,
            Piece::T => 3,
            Piece::S => 4,
            Piece::Z => 5,
            Piece::J => 6,
            Piece::L => 7,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Piece::I => "#00f0f0",
            Piece::O => "#f0f000",
            Piece::T => "#a000f0",
            Piece::S => "#00f000",
            Piece::Z => "#f00000",
            Piece::J => "#0000f0",
            Piece::L => "#f0a000",
        }
    }
}

/// Clockwise: column `i` read bottom to top becomes row `i`.
pub fn rotate_clockwise(shape: &[Vec<u8>]) -> Vec<Vec<u8>> {
    let cols = shape.first().map_or(0, Vec::len);
    (0..cols)
        .map(|col| shape.iter().rev().map(|row| row[col]).collect())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivePiece {
    pub piece: Piece,
    pub shape: Vec<Vec<u8>>,
    /// Board position of the shape's top-left cell.
    pub pos: Vec2i,
}

impl ActivePiece {
    pub fn spawn(piece: Piece) -> Self {
        Self {
            piece,
            shape: piece.shape(),
            pos: SPAWN_POS,
        }
    }

    /// Filled cells as board points at an arbitrary origin.
    pub fn cells_at<'a>(
        shape: &'a [Vec<u8>],
        pos: Vec2i,
    ) -> impl Iterator<Item = Vec2i> + 'a {
        shape.iter().enumerate().flat_map(move |(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| **cell != 0)
                .map(move |(dx, _)| pos + Vec2i::new(dx as i32, dy as i32))
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = Vec2i> + '_ {
        Self::cells_at(&self.shape, self.pos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TetrisInput {
    Left,
    Right,
    Down,
    Rotate,
    HardDrop,
    TogglePause,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TetrisSnapshot {
    pub board: Vec<Vec<u8>>,
    pub current_piece: Option<Piece>,
    pub current_piece_pos: Vec2i,
    pub lines_cleared: u32,
    pub level: u32,
    pub score: u32,
    #[serde(with = "crate::serde_duration")]
    pub fall_interval: Duration,
    pub paused: bool,
    pub game_over: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TetrisCore {
    board: Grid<u8>,
    current: Option<ActivePiece>,
    rng: Rng,
    score: u32,
    lines_cleared: u32,
    level: u32,
    paused: bool,
    game_over: bool,
}

impl TetrisCore {
    /// Fresh board with the first piece already spawned.
    pub fn new(seed: u64) -> Self {
        let mut core = Self {
            board: Grid::filled(BOARD_WIDTH, BOARD_HEIGHT, CELL_EMPTY),
            current: None,
            rng: Rng::new(seed),
            score: 0,
            lines_cleared: 0,
            level: 1,
            paused: false,
            game_over: false,
        };
        core.spawn_new_piece();
        core
    }

    pub fn board(&self) -> &Grid<u8> {
        &self.board
    }

    /// Board with the falling piece overlaid, for rendering.
    pub fn board_with_active_piece(&self) -> Vec<Vec<u8>> {
        let mut rows: Vec<Vec<u8>> = self.board.rows().map(|row| row.to_vec()).collect();
        if let Some(active) = &self.current {
            for cell in active.cells() {
                if self.board.contains_point(cell) {
                    rows[cell.y as usize][cell.x as usize] = active.piece.cell_value();
                }
            }
        }
        rows
    }

    pub fn current_piece(&self) -> Option<&ActivePiece> {
        self.current.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn fall_interval(&self) -> Duration {
        let speedup = FALL_STEP_MS * u64::from(self.level.saturating_sub(1));
        Duration::from_millis(BASE_FALL_MS.saturating_sub(speedup).max(MIN_FALL_MS))
    }

    pub fn snapshot(&self) -> TetrisSnapshot {
        TetrisSnapshot {
            board: self.board_with_active_piece(),
            current_piece: self.current.as_ref().map(|a| a.piece),
            current_piece_pos: self.current.as_ref().map_or(SPAWN_POS, |a| a.pos),
            lines_cleared: self.lines_cleared,
            level: self.level,
            score: self.score,
            fall_interval: self.fall_interval(),
            paused: self.paused,
            game_over: self.game_over,
        }
    }

    pub fn set_current_piece_for_test(&mut self, piece: Piece, pos: Vec2i) {
        self.current = Some(ActivePiece {
            piece,
            shape: piece.shape(),
            pos,
        });
    }

    pub fn set_cell(&mut self, x: usize, y: usize, value: u8) {
        self.board.set(y, x, value);
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.paused = !self.paused;
        true
    }

    pub fn spawn_new_piece(&mut self) -> bool {
        let piece = Piece::ALL[self.rng.below(Piece::ALL.len())];
        let active = ActivePiece::spawn(piece);
        let valid = self.is_valid_position(&active.shape, active.pos);
        self.current = Some(active);
        if !valid {
            debug!(?piece, score = self.score, "tetris game over");
            self.game_over = true;
        }
        valid
    }

    /// Columns must stay in range and rows below the floor are out; cells
    /// above the top edge are never checked against the board.
    pub fn is_valid_position(&self, shape: &[Vec<u8>], pos: Vec2i) -> bool {
        ActivePiece::cells_at(shape, pos).all(|cell| {
            if cell.x < 0 || cell.x >= BOARD_WIDTH as i32 || cell.y >= BOARD_HEIGHT as i32 {
                return false;
            }
            cell.y < 0 || self.board[(cell.y as usize, cell.x as usize)] == CELL_EMPTY
        })
    }

    fn can_act(&self) -> bool {
        !self.paused && !self.game_over && self.current.is_some()
    }

    pub fn move_piece(&mut self, dir: Vec2i) -> bool {
        if !self.can_act() {
            return false;
        }
        let Some(active) = &self.current else {
            return false;
        };
        let next = active.pos + dir;
        if self.is_valid_position(&active.shape, next) {
            if let Some(active) = self.current.as_mut() {
                active.pos = next;
            }
            return true;
        }
        false
    }

    /// One row down; a blocked piece lands instead. Returns `true` when the
    /// piece moved.
    pub fn move_piece_down(&mut self) -> bool {
        if !self.can_act() {
            return false;
        }
        if self.move_piece(Vec2i::DOWN) {
            return true;
        }
        self.land_piece();
        false
    }

    pub fn rotate_piece(&mut self) -> bool {
        if !self.can_act() {
            return false;
        }
        let Some(active) = &self.current else {
            return false;
        };
        let rotated = rotate_clockwise(&active.shape);
        if !self.is_valid_position(&rotated, active.pos) {
            return false;
        }
        if let Some(active) = self.current.as_mut() {
            active.shape = rotated;
        }
        true
    }

    /// Drops straight down and lands. Returns the number of rows fallen.
    pub fn hard_drop(&mut self) -> u32 {
        if !self.can_act() {
            return 0;
        }
        let mut distance = 0;
        while self.move_piece(Vec2i::DOWN) {
            distance += 1;
        }
        self.land_piece();
        distance
    }

    fn land_piece(&mut self) {
        let Some(active) = self.current.take() else {
            return;
        };
        let value = active.piece.cell_value();
        for cell in active.cells().filter(|cell| cell.y >= 0) {
            self.board.set(cell.y as usize, cell.x as usize, value);
        }
        self.clear_lines();
        self.spawn_new_piece();
    }

    /// Removes full rows and scores them at the level held before the clear.
    pub fn clear_lines(&mut self) -> usize {
        let full: Vec<usize> = (0..BOARD_HEIGHT)
            .filter(|&row| self.board.row(row).iter().all(|&cell| cell != CELL_EMPTY))
            .collect();
        let cleared = self.board.remove_rows(&full, CELL_EMPTY);
        if cleared == 0 {
            return 0;
        }

        self.score = self
            .score
            .saturating_add(cleared as u32 * POINTS_PER_LINE * self.level);
        self.lines_cleared += cleared as u32;
        self.level = self.lines_cleared / LINES_PER_LEVEL + 1;
        debug!(cleared, level = self.level, score = self.score, "lines cleared");
        cleared
    }
}

impl GridGame for TetrisCore {
    type Input = TetrisInput;
    type Snapshot = TetrisSnapshot;

    fn apply_input(&mut self, input: TetrisInput) -> bool {
        match input {
            TetrisInput::TogglePause => self.toggle_pause(),
            TetrisInput::Left => self.move_piece(Vec2i::LEFT),
            TetrisInput::Right => self.move_piece(Vec2i::RIGHT),
            TetrisInput::Rotate => self.rotate_piece(),
            TetrisInput::Down => {
                let acted = self.can_act();
                self.move_piece_down();
                acted
            }
            TetrisInput::HardDrop => {
                let acted = self.can_act();
                self.hard_drop();
                acted
            }
        }
    }

    fn tick(&mut self) {
        self.move_piece_down();
    }

    fn is_over(&self) -> bool {
        self.game_over
    }

    fn snapshot(&self) -> TetrisSnapshot {
        TetrisCore::snapshot(self)
    }
}
