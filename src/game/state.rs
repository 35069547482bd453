//! Board, turn and move log for one match

use tracing::{debug, info};

use super::{GameStatus, Ignored, Move, MoveLog, MoveOutcome};
use crate::board::{Board, Pos, Stone};
use crate::rules::{detect_win, WinLine};

/// Main game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    current_turn: Stone,
    status: GameStatus,
    win_line: Option<WinLine>,
    log: MoveLog,
}

impl GameState {
    pub fn new(size: usize) -> Self {
        Self {
            board: Board::new(size),
            current_turn: Stone::Black,
            status: GameStatus::InProgress,
            win_line: None,
            log: MoveLog::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Stone {
        self.current_turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn win_line(&self) -> Option<&WinLine> {
        self.win_line.as_ref()
    }

    pub fn move_log(&self) -> &MoveLog {
        &self.log
    }

    pub fn last_move(&self) -> Option<Pos> {
        self.log.last().map(|m| m.pos)
    }

    /// Place a stone for the side to move.
    ///
    /// Ignored without any state change when the game is over or the cell is
    /// off the board or taken.
    pub fn apply_move(&mut self, pos: Pos) -> MoveOutcome {
        if self.status.is_over() {
            debug!(%pos, "move ignored: game over");
            return MoveOutcome::Ignored(Ignored::GameOver);
        }

        let color = self.current_turn;
        if let Err(err) = self.board.place(pos, color) {
            debug!(%pos, %err, "move ignored");
            return MoveOutcome::Ignored(Ignored::Board(err));
        }
        self.log.push(Move::new(pos, color));

        if let Some(line) = detect_win(&self.board, pos, color) {
            info!(winner = color.symbol(), moves = self.log.len(), "five in a row");
            self.win_line = Some(line);
            self.status = GameStatus::Won(color);
            return MoveOutcome::Won { winner: color };
        }

        if self.board.is_full() {
            info!(moves = self.log.len(), "board full, draw");
            self.status = GameStatus::Draw;
            return MoveOutcome::Draw;
        }

        self.current_turn = color.opponent();
        MoveOutcome::Placed {
            next: self.current_turn,
        }
    }

    /// Back to an empty board with Black to move
    pub fn reset(&mut self) {
        self.board = Board::new(self.board.size());
        self.current_turn = Stone::Black;
        self.status = GameStatus::InProgress;
        self.win_line = None;
        self.log.clear();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(crate::board::DEFAULT_BOARD_SIZE)
    }
}
