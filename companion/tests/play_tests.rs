use arcade::GameId;
use companion::play;
use companion::script::ScriptError;

const BLACK_ROW: &str = "7,0 8,0 7,1 8,1 7,2 8,2 7,3 8,3 7,4";

#[test]
fn gomoku_script_reaches_a_win() {
    let report = play(GameId::Gomoku, 0, BLACK_ROW).unwrap();
    assert!(report.over);
    assert_eq!(report.frame, 9);
    let mut lines = report.board.lines();
    assert_eq!(lines.next(), Some("winner: Black"));
    let row7 = lines.nth(7).unwrap();
    assert!(row7.starts_with("X X X X X ."), "{row7}");
}

#[test]
fn undo_and_redo_walk_the_history() {
    let report = play(GameId::Gomoku, 0, "7,7 8,8 undo").unwrap();
    assert_eq!(report.frame, 1);
    assert!(report.board.starts_with("to move: White"));
    assert!(!report.board.contains('O'));

    let report = play(GameId::Gomoku, 0, "7,7 8,8 undo redo").unwrap();
    assert_eq!(report.frame, 2);
    assert!(report.board.contains('O'));
}

#[test]
fn bad_tokens_are_reported() {
    assert_eq!(
        play(GameId::Snake, 1, "up sideways"),
        Err(ScriptError::UnknownToken("sideways".into()))
    );
    assert_eq!(
        play(GameId::Tetris, 1, "tick*0"),
        Err(ScriptError::BadRepeat("tick*0".into()))
    );
    assert_eq!(
        play(GameId::Gomoku, 1, "7,x"),
        Err(ScriptError::UnknownToken("7,x".into()))
    );
}

#[test]
fn snake_ticks_advance_frames() {
    let report = play(GameId::Snake, 3, "tick*3").unwrap();
    assert_eq!(report.frame, 3);
    assert!(!report.over);
    assert_eq!(report.board.matches('@').count(), 1);
}

#[test]
fn tetris_drop_lands_on_the_floor() {
    let report = play(GameId::Tetris, 5, "drop").unwrap();
    let floor = report.board.lines().last().unwrap();
    assert!(floor.contains('#'), "{}", report.board);
    assert_eq!(floor.len(), 10);
}

#[test]
fn puzzle_clock_counts_ticks() {
    let report = play(GameId::Puzzle, 7, "tick*65").unwrap();
    assert!(report.board.starts_with("moves: 0  time: 01:05"), "{}", report.board);
    assert_eq!(report.board.lines().count(), 4);
}

#[test]
fn every_catalog_game_plays_an_empty_script() {
    for info in &arcade::CATALOG {
        let report = play(info.id, 11, "").unwrap();
        assert_eq!(report.frame, 0);
        assert!(!report.over, "{} starts finished", info.id);
    }
}
