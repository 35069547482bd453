use super::*;
use crate::error::BoardError;

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_stone_symbols() {
    assert_eq!(Stone::Black.symbol(), "X");
    assert_eq!(Stone::White.symbol(), "O");
    assert_eq!(Stone::from_symbol("X"), Some(Stone::Black));
    assert_eq!(Stone::from_symbol("O"), Some(Stone::White));
    assert_eq!(Stone::from_symbol("x"), None);
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::new(7, 7); // Center of 15x15
    assert_eq!(pos.to_index(15), 112);

    let pos2 = Pos::from_index(112, 15);
    assert_eq!(pos2, pos);
}

#[test]
fn test_pos_validity() {
    assert!(Pos::is_valid(0, 0, 15));
    assert!(Pos::is_valid(14, 14, 15));
    assert!(!Pos::is_valid(-1, 0, 15));
    assert!(!Pos::is_valid(0, -1, 15));
    assert!(!Pos::is_valid(15, 0, 15));
    assert!(!Pos::is_valid(0, 15, 15));
}

#[test]
fn test_pos_offset_stops_at_edge() {
    let corner = Pos::new(0, 14);
    assert_eq!(corner.offset(1, -1, 2, 15), Some(Pos::new(2, 12)));
    assert_eq!(corner.offset(-1, 0, 1, 15), None);
    assert_eq!(corner.offset(0, 1, 1, 15), None);
}

#[test]
fn test_pos_ordering() {
    assert!(Pos::new(0, 0) < Pos::new(0, 1));
    assert!(Pos::new(0, 14) < Pos::new(1, 0));
}

#[test]
fn test_new_board_is_empty() {
    let board = Board::new(15);
    assert_eq!(board.size(), 15);
    assert!(board.is_board_empty());
    assert_eq!(board.stone_count(), 0);
    assert_eq!(Board::default().size(), DEFAULT_BOARD_SIZE);
}

#[test]
fn test_place_sets_only_target() {
    let mut board = Board::new(15);
    board.place(Pos::new(3, 4), Stone::Black).unwrap();
    assert_eq!(board.get(Pos::new(3, 4)), Stone::Black);
    assert_eq!(board.stone_count(), 1);
    assert_eq!(board.stones().collect::<Vec<_>>(), vec![(Pos::new(3, 4), Stone::Black)]);
}

#[test]
fn test_place_out_of_bounds() {
    let mut board = Board::new(15);
    let err = board.place(Pos::new(15, 0), Stone::Black).unwrap_err();
    assert_eq!(err, BoardError::OutOfBounds { row: 15, col: 0, size: 15 });
    assert!(board.is_board_empty());
}

#[test]
fn test_place_on_occupied_is_rejected() {
    let mut board = Board::new(15);
    board.place(Pos::new(0, 0), Stone::Black).unwrap();
    let before = board.clone();

    let err = board.place(Pos::new(0, 0), Stone::White).unwrap_err();
    assert_eq!(err, BoardError::CellOccupied { row: 0, col: 0 });
    assert_eq!(board, before);
}

#[test]
fn test_remove_stone() {
    let mut board = Board::new(15);
    board.place(Pos::new(5, 5), Stone::White).unwrap();
    board.remove_stone(Pos::new(5, 5));
    assert!(board.is_empty(Pos::new(5, 5)));
    // Off-board removal is ignored
    board.remove_stone(Pos::new(200, 200));
}

#[test]
fn test_full_board() {
    let mut board = Board::new(2);
    assert_eq!(board.first_empty(), Some(Pos::new(0, 0)));
    for idx in 0..4 {
        board.place(Pos::from_index(idx, 2), Stone::Black).unwrap();
    }
    assert!(board.is_full());
    assert_eq!(board.first_empty(), None);
}

#[test]
fn test_display_marks_stones() {
    let mut board = Board::new(5);
    board.place(Pos::new(0, 0), Stone::Black).unwrap();
    board.place(Pos::new(1, 1), Stone::White).unwrap();
    let text = board.to_string();
    assert!(text.contains("X"));
    assert!(text.contains("O"));
    assert_eq!(text.lines().count(), 6);
}
