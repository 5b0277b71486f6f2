use arcade::GameId;
use arcade::gomoku::Gomoku;
use arcade::match3::Match3;
use arcade::puzzle::SwapPuzzle;
use arcade::snake::Snake;
use arcade::tetris_core::TetrisCore;
use arcade::xiangqi::ChessLite;
use engine::{GridGame, GridLogic, HeadlessRunner};
use tracing::debug;

use crate::board::Board;
use crate::script::{Command, ScriptError, parse_cell, parse_script, parse_snake, parse_tetris};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayReport {
    pub game: GameId,
    /// Runner frame after the script, i.e. steps applied minus undos.
    pub frame: usize,
    pub over: bool,
    pub board: String,
}

/// Feeds `commands` through a [`HeadlessRunner`], honouring undo and redo.
pub fn drive<G>(game: G, commands: Vec<Command<G::Input>>) -> HeadlessRunner<GridLogic<G>>
where
    G: GridGame + Clone,
{
    let mut runner = HeadlessRunner::new(GridLogic::new(game));
    for command in commands {
        match command {
            Command::Step(step) => {
                runner.step(step);
            }
            Command::Undo => {
                runner.rewind(1);
            }
            Command::Redo => {
                runner.forward(1);
            }
        }
    }
    runner
}

fn run<G, F>(id: GameId, game: G, script: &str, parse: F) -> Result<PlayReport, ScriptError>
where
    G: GridGame + Board + Clone,
    G::Input: Clone,
    F: FnMut(&str) -> Option<G::Input>,
{
    let commands = parse_script(script, parse)?;
    let runner = drive(game, commands);
    let state = runner.state();
    let report = PlayReport {
        game: id,
        frame: runner.frame(),
        over: state.is_over(),
        board: state.render(),
    };
    debug!(game = %id, frame = report.frame, over = report.over, "script finished");
    Ok(report)
}

/// Plays `script` against a fresh game. The seed only matters for games
/// with random boards or pieces.
pub fn play(id: GameId, seed: u64, script: &str) -> Result<PlayReport, ScriptError> {
    match id {
        GameId::Gomoku => run(id, Gomoku::new(), script, parse_cell),
        GameId::Chess => run(id, ChessLite::new(), script, parse_cell),
        GameId::Match3 => run(id, Match3::new(seed), script, parse_cell),
        GameId::Puzzle => run(id, SwapPuzzle::new(seed), script, parse_cell),
        GameId::Snake => run(id, Snake::new(seed), script, parse_snake),
        GameId::Tetris => run(id, TetrisCore::new(seed), script, parse_tetris),
    }
}
