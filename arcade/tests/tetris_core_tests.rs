use arcade::tetris_core::{
    BOARD_HEIGHT, BOARD_WIDTH, CELL_EMPTY, Piece, SPAWN_POS, TetrisCore, TetrisInput,
};
use engine::{GridGame, Vec2i};

fn fill_row_except(core: &mut TetrisCore, row: usize, gap: std::ops::Range<usize>) {
    for col in 0..BOARD_WIDTH {
        if !gap.contains(&col) {
            core.set_cell(col, row, 9);
        }
    }
}

#[test]
fn new_game_spawns_at_column_four_row_zero() {
    let core = TetrisCore::new(5);
    let active = core.current_piece().unwrap();
    assert_eq!(active.pos, SPAWN_POS);
    assert_eq!(core.level(), 1);
    assert_eq!(core.score(), 0);
    assert!(core.board().iter().all(|(_, _, &cell)| cell == CELL_EMPTY));
}

#[test]
fn single_line_at_level_one_scores_one_hundred() {
    let mut core = TetrisCore::new(1);
    fill_row_except(&mut core, BOARD_HEIGHT - 1, 0..4);
    core.set_current_piece_for_test(Piece::I, Vec2i::new(0, 0));

    core.hard_drop();

    assert_eq!(core.lines_cleared(), 1);
    assert_eq!(core.score(), 100);
    assert!(core.board().row(BOARD_HEIGHT - 1).iter().all(|&c| c == CELL_EMPTY));
}

#[test]
fn double_line_at_level_one_scores_exactly_two_hundred() {
    let mut core = TetrisCore::new(1);
    fill_row_except(&mut core, BOARD_HEIGHT - 2, 0..2);
    fill_row_except(&mut core, BOARD_HEIGHT - 1, 0..2);
    core.set_current_piece_for_test(Piece::O, Vec2i::new(0, 3));

    core.hard_drop();

    assert_eq!(core.lines_cleared(), 2);
    assert_eq!(core.score(), 200);
}

#[test]
fn rows_above_a_clear_shift_down() {
    let mut core = TetrisCore::new(1);
    core.set_cell(7, BOARD_HEIGHT - 2, 3);
    fill_row_except(&mut core, BOARD_HEIGHT - 1, 0..4);
    core.set_current_piece_for_test(Piece::I, Vec2i::new(0, 0));

    core.hard_drop();

    assert_eq!(core.board()[(BOARD_HEIGHT - 1, 7)], 3);
    assert_eq!(core.board()[(BOARD_HEIGHT - 2, 7)], CELL_EMPTY);
}

#[test]
fn tenth_line_scores_at_the_old_level() {
    let mut core = TetrisCore::new(1);
    for _ in 0..10 {
        fill_row_except(&mut core, BOARD_HEIGHT - 1, 0..4);
        core.set_current_piece_for_test(Piece::I, Vec2i::new(0, 0));
        core.hard_drop();
    }
    assert_eq!(core.score(), 1_000);
    assert_eq!(core.level(), 2);

    fill_row_except(&mut core, BOARD_HEIGHT - 1, 0..4);
    core.set_current_piece_for_test(Piece::I, Vec2i::new(0, 0));
    core.hard_drop();
    assert_eq!(core.score(), 1_200);
}

#[test]
fn tick_moves_down_then_lands() {
    let mut core = TetrisCore::new(2);
    core.set_current_piece_for_test(Piece::O, Vec2i::new(4, BOARD_HEIGHT as i32 - 3));
    core.tick();
    assert_eq!(core.current_piece().unwrap().pos.y, BOARD_HEIGHT as i32 - 2);

    core.tick();
    assert_eq!(core.board()[(BOARD_HEIGHT - 1, 4)], Piece::O.cell_value());
    assert_eq!(core.current_piece().unwrap().pos, SPAWN_POS);
}

#[test]
fn rotation_against_the_wall_is_rejected() {
    let mut core = TetrisCore::new(2);
    // Vertical I hugging the right wall cannot swing back to horizontal.
    core.set_current_piece_for_test(Piece::I, Vec2i::new(0, 5));
    assert!(core.rotate_piece());
    assert!(core.move_piece(Vec2i::new(BOARD_WIDTH as i32 - 1, 0)));
    assert!(!core.rotate_piece());
}

#[test]
fn walls_stop_sideways_moves() {
    let mut core = TetrisCore::new(2);
    core.set_current_piece_for_test(Piece::O, Vec2i::new(0, 5));
    assert!(!core.apply_input(TetrisInput::Left));
    assert!(core.apply_input(TetrisInput::Right));
}

#[test]
fn pause_freezes_everything_but_unpause() {
    let mut core = TetrisCore::new(2);
    let before = core.current_piece().unwrap().pos;
    assert!(core.apply_input(TetrisInput::TogglePause));
    core.tick();
    assert!(!core.apply_input(TetrisInput::Left));
    assert!(!core.apply_input(TetrisInput::HardDrop));
    assert_eq!(core.current_piece().unwrap().pos, before);

    assert!(core.apply_input(TetrisInput::TogglePause));
    core.tick();
    assert_eq!(core.current_piece().unwrap().pos.y, before.y + 1);
}

#[test]
fn blocked_spawn_ends_the_game() {
    let mut core = TetrisCore::new(3);
    for row in 0..4 {
        for col in 0..BOARD_WIDTH {
            if col != 0 {
                core.set_cell(col, row, 9);
            }
        }
    }
    core.set_current_piece_for_test(Piece::O, Vec2i::new(0, -2));
    core.hard_drop();
    assert!(core.is_game_over());
    assert!(core.is_over());
    assert!(!core.apply_input(TetrisInput::TogglePause));
}
