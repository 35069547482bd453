//! Property tests for the board rules and the live/replay engines

use gomoku::game::GameStatus;
use gomoku::rules::WIN_CONDITION;
use gomoku::{detect_win, Board, GameMode, LiveGame, MoveOutcome, Pos, ReplayEngine, Stone};
use proptest::prelude::*;

const SIZE: usize = 15;

fn arbitrary_pos() -> impl Strategy<Value = Pos> {
    (0u8..SIZE as u8, 0u8..SIZE as u8).prop_map(|(row, col)| Pos::new(row, col))
}

/// Moves including off-board coordinates, to exercise rejection
fn arbitrary_click() -> impl Strategy<Value = Pos> {
    (0u8..SIZE as u8 + 3, 0u8..SIZE as u8 + 3).prop_map(|(row, col)| Pos::new(row, col))
}

/// Longest run of `player` through `pos` along one axis, counted cell by cell
fn brute_force_run(board: &Board, pos: Pos, player: Stone, dr: i32, dc: i32) -> usize {
    let mut count = 0;
    let mut best = 0;
    for step in -(SIZE as i32)..=(SIZE as i32) {
        let row = pos.row as i32 + dr * step;
        let col = pos.col as i32 + dc * step;
        if !Pos::is_valid(row, col, SIZE) {
            count = 0;
            continue;
        }
        let cell = Pos::new(row as u8, col as u8);
        if board.get(cell) == player {
            count += 1;
            // Only runs that include `pos` count
            if step >= 0 {
                best = best.max(count);
            }
        } else {
            if step >= 0 {
                break;
            }
            count = 0;
        }
    }
    best
}

fn play_out(clicks: &[Pos]) -> (LiveGame, Vec<MoveOutcome>) {
    let mut game = LiveGame::new(GameMode::PvP, SIZE);
    let outcomes = clicks.iter().map(|&pos| game.apply_move(pos)).collect();
    (game, outcomes)
}

proptest! {
    /// A rejected move leaves board, turn and log exactly as they were
    #[test]
    fn prop_ignored_moves_change_nothing(clicks in prop::collection::vec(arbitrary_click(), 1..120)) {
        let mut game = LiveGame::new(GameMode::PvP, SIZE);
        for pos in clicks {
            let board = game.board().clone();
            let turn = game.current_turn();
            let logged = game.move_log().len();
            let status = game.status();

            if game.apply_move(pos).is_ignored() {
                prop_assert_eq!(game.board(), &board);
                prop_assert_eq!(game.current_turn(), turn);
                prop_assert_eq!(game.move_log().len(), logged);
                prop_assert_eq!(game.status(), status);
            } else {
                prop_assert_eq!(game.move_log().len(), logged + 1);
            }
        }
    }

    /// Logged moves alternate colors starting with Black
    #[test]
    fn prop_turns_alternate(clicks in prop::collection::vec(arbitrary_pos(), 0..150)) {
        let (game, _) = play_out(&clicks);
        for (i, mv) in game.move_log().iter().enumerate() {
            let expected = if i % 2 == 0 { Stone::Black } else { Stone::White };
            prop_assert_eq!(mv.stone, expected);
            prop_assert_eq!(game.board().get(mv.pos), mv.stone);
        }
        prop_assert_eq!(game.board().stone_count(), game.move_log().len());
    }

    /// Win detection agrees with a cell-by-cell count on random boards
    #[test]
    fn prop_detect_win_matches_brute_force(
        cells in prop::collection::vec((arbitrary_pos(), any::<bool>()), 0..120),
        target in arbitrary_pos(),
    ) {
        let mut board = Board::new(SIZE);
        for (pos, black) in cells {
            let stone = if black { Stone::Black } else { Stone::White };
            let _ = board.place(pos, stone);
        }

        for player in [Stone::Black, Stone::White] {
            let longest = [(0, 1), (1, 0), (1, 1), (-1, 1)]
                .iter()
                .map(|&(dr, dc)| brute_force_run(&board, target, player, dr, dc))
                .max()
                .unwrap_or(0);
            let found = detect_win(&board, target, player);

            if board.get(target) != player {
                prop_assert!(found.is_none());
                continue;
            }
            prop_assert_eq!(found.is_some(), longest >= WIN_CONDITION);
            if let Some(line) = found {
                prop_assert!(line.len() >= WIN_CONDITION);
                prop_assert!(line.contains(target));
                prop_assert!(line.cells().iter().all(|&p| board.get(p) == player));
            }
        }
    }

    /// A finished game's win line holds only the winner's stones and the last move
    #[test]
    fn prop_win_line_is_sound(clicks in prop::collection::vec(arbitrary_pos(), 0..200)) {
        let (game, outcomes) = play_out(&clicks);
        let wins = outcomes.iter().filter(|o| matches!(o, MoveOutcome::Won { .. })).count();
        prop_assert!(wins <= 1);

        match game.status() {
            GameStatus::Won(winner) => {
                let line = game.win_line();
                prop_assert!(line.is_some());
                if let Some(line) = line {
                    prop_assert_eq!(line.player(), winner);
                    prop_assert!(line.len() >= WIN_CONDITION);
                    prop_assert!(line.cells().iter().all(|&p| game.board().get(p) == winner));
                    let last = game.last_move();
                    prop_assert!(last.is_some_and(|pos| line.contains(pos)));
                }
            }
            _ => prop_assert!(game.win_line().is_none()),
        }
    }

    /// Replaying a saved game rebuilds the same board, and rewinding empties it
    #[test]
    fn prop_replay_rebuilds_board(clicks in prop::collection::vec(arbitrary_pos(), 0..120)) {
        let (game, _) = play_out(&clicks);
        let record = game.to_record("property match");
        let payload = serde_json::to_string(&record).unwrap();

        let mut replay = ReplayEngine::from_payload(Some(&payload), SIZE).unwrap();
        prop_assert_eq!(replay.len(), game.move_log().len());

        replay.fast_forward();
        prop_assert_eq!(replay.board(), game.board());
        prop_assert!(!replay.can_step_forward());
        let expect_highlight = game.win_line().is_some();
        prop_assert_eq!(!replay.highlighted_win().is_empty(), expect_highlight);

        replay.rewind();
        prop_assert!(replay.board().is_board_empty());
        prop_assert_eq!(replay.current_move_index(), None);
        prop_assert_eq!(replay.move_info(), format!("Move 0/{}", game.move_log().len()));
    }
}
