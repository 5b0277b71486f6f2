//! Whitespace-separated input scripts for headless play.
//!
//! `tick` (or `.`) advances the clock, `undo`/`redo` move through the
//! runner's history, and anything else is handed to the game's own token
//! parser. A `*N` suffix repeats a token, e.g. `tick*10`.

use arcade::snake::{Direction, SnakeInput};
use arcade::tetris_core::TetrisInput;
use engine::Step;
use thiserror::Error;

pub const MAX_REPEAT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<I> {
    Step(Step<I>),
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unrecognised input '{0}'")]
    UnknownToken(String),
    #[error("bad repeat count in '{0}' (expected 1..={MAX_REPEAT})")]
    BadRepeat(String),
}

pub fn parse_script<I, F>(script: &str, mut parse_input: F) -> Result<Vec<Command<I>>, ScriptError>
where
    I: Clone,
    F: FnMut(&str) -> Option<I>,
{
    let mut commands = Vec::new();
    for token in script.split_whitespace() {
        let (body, times) = match token.split_once('*') {
            Some((body, count)) => {
                let times = count
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=MAX_REPEAT).contains(n))
                    .ok_or_else(|| ScriptError::BadRepeat(token.to_string()))?;
                (body, times)
            }
            None => (token, 1),
        };

        let body = body.to_ascii_lowercase();
        let command = match body.as_str() {
            "tick" | "." => Command::Step(Step::Tick),
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            other => parse_input(other)
                .map(|input| Command::Step(Step::Input(input)))
                .ok_or_else(|| ScriptError::UnknownToken(token.to_string()))?,
        };
        commands.extend(std::iter::repeat_n(command, times));
    }
    Ok(commands)
}

/// `row,col`
pub fn parse_cell(token: &str) -> Option<(usize, usize)> {
    let (row, col) = token.split_once(',')?;
    Some((row.trim().parse().ok()?, col.trim().parse().ok()?))
}

pub fn parse_snake(token: &str) -> Option<SnakeInput> {
    let input = match token {
        "up" | "u" => SnakeInput::Turn(Direction::Up),
        "down" | "d" => SnakeInput::Turn(Direction::Down),
        "left" | "l" => SnakeInput::Turn(Direction::Left),
        "right" | "r" => SnakeInput::Turn(Direction::Right),
        "pause" | "p" => SnakeInput::TogglePause,
        _ => return None,
    };
    Some(input)
}

pub fn parse_tetris(token: &str) -> Option<TetrisInput> {
    let input = match token {
        "left" | "l" => TetrisInput::Left,
        "right" | "r" => TetrisInput::Right,
        "down" | "d" => TetrisInput::Down,
        "rotate" | "rot" => TetrisInput::Rotate,
        "drop" => TetrisInput::HardDrop,
        "pause" | "p" => TetrisInput::TogglePause,
        _ => return None,
    };
    Some(input)
}
