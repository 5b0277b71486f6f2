use arcade::xiangqi::{
    ChessLite, ChessPiece, ClickOutcome, MoveOutcome, PieceKind, Side,
};
use engine::GridGame;

fn piece(kind: PieceKind, side: Side) -> Option<ChessPiece> {
    Some(ChessPiece::new(kind, side))
}

#[test]
fn red_moves_first() {
    let mut game = ChessLite::new();
    assert_eq!(game.to_move(), Side::Red);
    // Black pawn cannot move on red's turn.
    assert_eq!(game.try_move((3, 0), (4, 0)), MoveOutcome::Illegal);
    assert_eq!(game.try_move((6, 0), (5, 0)), MoveOutcome::Moved);
    assert_eq!(game.to_move(), Side::Black);
}

#[test]
fn cannon_needs_a_screen_to_capture_and_none_to_move() {
    let mut game = ChessLite::empty();
    game.put(5, 0, piece(PieceKind::Cannon, Side::Red));
    game.put(5, 4, piece(PieceKind::Pawn, Side::Black));

    assert!(!game.can_move((5, 0), (5, 4)));
    assert!(game.can_move((5, 0), (5, 1)));

    game.put(5, 2, piece(PieceKind::Pawn, Side::Red));
    assert!(game.can_move((5, 0), (5, 4)));
    assert!(!game.can_move((5, 0), (5, 3)));
    assert_eq!(
        game.try_move((5, 0), (5, 4)),
        MoveOutcome::Captured(PieceKind::Pawn)
    );
}

#[test]
fn chariot_is_blocked_by_an_intervening_piece() {
    let mut game = ChessLite::empty();
    game.put(9, 0, piece(PieceKind::Chariot, Side::Red));
    game.put(4, 0, piece(PieceKind::Pawn, Side::Black));

    assert!(game.can_move((9, 0), (4, 0)));
    assert!(!game.can_move((9, 0), (2, 0)));
    assert!(!game.can_move((9, 0), (8, 1)));
}

#[test]
fn capturing_the_king_ends_the_game() {
    let mut game = ChessLite::empty();
    game.put(9, 0, piece(PieceKind::Chariot, Side::Red));
    game.put(0, 0, piece(PieceKind::King, Side::Black));
    game.put(9, 4, piece(PieceKind::King, Side::Red));

    assert_eq!(
        game.try_move((9, 0), (0, 0)),
        MoveOutcome::KingCaptured(Side::Red)
    );
    assert_eq!(game.winner(), Some(Side::Red));
    assert!(game.is_over());
    assert_eq!(game.try_move((9, 4), (8, 4)), MoveOutcome::Illegal);
}

#[test]
fn own_piece_blocks_destination() {
    let game = ChessLite::new();
    assert!(game.can_move((9, 1), (7, 2)));
    assert!(game.can_move((9, 2), (7, 4)));
    assert!(!game.can_move((9, 4), (9, 3)));
    assert!(!game.can_move((9, 0), (9, 1)));
}

#[test]
fn second_click_always_clears_selection() {
    let mut game = ChessLite::new();
    assert_eq!(game.click(3, 0), ClickOutcome::Ignored);
    assert_eq!(game.click(6, 0), ClickOutcome::Selected);
    assert_eq!(game.click(4, 4), ClickOutcome::Deselected);
    assert_eq!(game.selected(), None);
    assert_eq!(game.to_move(), Side::Red);

    game.click(6, 0);
    assert_eq!(game.click(5, 0), ClickOutcome::Move(MoveOutcome::Moved));
    assert_eq!(game.selected(), None);
    assert_eq!(game.to_move(), Side::Black);
}
