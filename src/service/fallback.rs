//! Offline bot used when no engine binary is configured

use tracing::debug;

use super::{MoveSuggester, SessionService};
use crate::board::{Board, Pos, Stone};
use crate::error::CollaboratorError;

/// Plays the first empty cell in row-major order.
///
/// Like a remote service it only sees the opponent's moves, so it mirrors the
/// game on its own board for the length of a session.
#[derive(Debug, Clone)]
pub struct FirstEmptyBot {
    board: Board,
}

impl FirstEmptyBot {
    pub fn new(size: usize) -> Self {
        Self {
            board: Board::new(size),
        }
    }
}

impl MoveSuggester for FirstEmptyBot {
    fn suggest_move(&mut self, last_move: Pos) -> Result<Pos, CollaboratorError> {
        // The opponent's cell may already be known if a reply was dropped
        let _ = self.board.place(last_move, Stone::Black);

        let reply = self
            .board
            .first_empty()
            .ok_or_else(|| CollaboratorError::unavailable("fallback bot", "board is full"))?;
        let _ = self.board.place(reply, Stone::White);
        debug!(%last_move, %reply, "fallback bot reply");
        Ok(reply)
    }
}

impl SessionService for FirstEmptyBot {
    fn start_session(&mut self) -> Result<(), CollaboratorError> {
        self.board = Board::new(self.board.size());
        Ok(())
    }

    fn stop_session(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }
}
