//! Plain-text boards: one status line, then the grid.

use std::fmt::Write;

use arcade::gomoku::{Gomoku, Stone};
use arcade::match3::Match3;
use arcade::puzzle::SwapPuzzle;
use arcade::snake::{BOARD_HEIGHT, BOARD_WIDTH, Snake};
use arcade::tetris_core::{CELL_EMPTY, TetrisCore};
use arcade::xiangqi::ChessLite;
use engine::{Grid, Vec2i};

pub trait Board {
    fn status(&self) -> String;
    fn grid(&self) -> Vec<String>;

    fn render(&self) -> String {
        let mut out = self.status();
        for line in self.grid() {
            out.push('\n');
            out.push_str(&line);
        }
        out
    }
}

fn grid_lines<T>(grid: &Grid<T>, mut cell: impl FnMut(&T) -> char, sep: &str) -> Vec<String> {
    grid.rows()
        .map(|row| {
            row.iter()
                .map(|c| cell(c).to_string())
                .collect::<Vec<_>>()
                .join(sep)
        })
        .collect()
}

impl Board for Gomoku {
    fn status(&self) -> String {
        match self.winner() {
            Some(stone) => format!("winner: {stone:?}"),
            None => format!("to move: {:?}", self.to_move()),
        }
    }

    fn grid(&self) -> Vec<String> {
        grid_lines(
            self.board(),
            |cell| match cell {
                Some(Stone::Black) => 'X',
                Some(Stone::White) => 'O',
                None => '.',
            },
            " ",
        )
    }
}

impl Board for ChessLite {
    fn status(&self) -> String {
        let mut status = match self.winner() {
            Some(side) => format!("winner: {side:?}"),
            None => format!("to move: {:?}", self.to_move()),
        };
        if let Some((row, col)) = self.selected() {
            let _ = write!(status, "  selected: {row},{col}");
        }
        status
    }

    fn grid(&self) -> Vec<String> {
        // Full-width dot keeps columns aligned with the CJK glyphs.
        grid_lines(self.board(), |cell| cell.map_or('．', |p| p.glyph()), "")
    }
}

impl Board for Match3 {
    fn status(&self) -> String {
        let mut status = format!("score: {}  moves left: {}", self.score(), self.moves_left());
        if self.is_game_over() {
            status.push_str("  game over");
        }
        status
    }

    fn grid(&self) -> Vec<String> {
        grid_lines(self.board(), |gem| gem.letter(), " ")
    }
}

impl Board for SwapPuzzle {
    fn status(&self) -> String {
        let mut status = format!("moves: {}  time: {}", self.moves(), self.elapsed_label());
        if self.is_completed() {
            status.push_str("  solved");
        }
        status
    }

    fn grid(&self) -> Vec<String> {
        grid_lines(
            self.tiles(),
            |id| char::from_digit(u32::from(*id) + 1, 10).unwrap_or('?'),
            " ",
        )
    }
}

impl Board for Snake {
    fn status(&self) -> String {
        let mut status = format!(
            "score: {}  length: {}  interval: {}ms",
            self.score(),
            self.len(),
            self.interval().as_millis()
        );
        if self.is_game_over() {
            status.push_str("  game over");
        } else if self.is_paused() {
            status.push_str("  paused");
        }
        status
    }

    fn grid(&self) -> Vec<String> {
        let head = self.head();
        let body: Vec<Vec2i> = self.body().collect();
        (0..BOARD_HEIGHT)
            .map(|y| {
                (0..BOARD_WIDTH)
                    .map(|x| {
                        let p = Vec2i::new(x, y);
                        if p == head {
                            '@'
                        } else if body.contains(&p) {
                            'o'
                        } else if self.food() == Some(p) {
                            '*'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl Board for TetrisCore {
    fn status(&self) -> String {
        let mut status = format!(
            "score: {}  level: {}  lines: {}",
            self.score(),
            self.level(),
            self.lines_cleared()
        );
        if self.is_game_over() {
            status.push_str("  game over");
        } else if self.is_paused() {
            status.push_str("  paused");
        }
        status
    }

    fn grid(&self) -> Vec<String> {
        self.board_with_active_piece()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if v == CELL_EMPTY { '.' } else { '#' })
                    .collect()
            })
            .collect()
    }
}
