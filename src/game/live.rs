//! Live match engine: hotseat or against a remote bot

use tracing::{info, warn};

use super::{GameState, GameStatus, Ignored, MoveLog, MoveOutcome};
use crate::board::{Board, Pos, Stone};
use crate::error::CollaboratorError;
use crate::record::GameRecord;
use crate::rules::WinLine;
use crate::service::{MoveSuggester, RecordStore, SessionService};

/// Game mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Player vs Player (hotseat)
    #[default]
    PvP,
    /// Player vs remote bot; the bot plays White ("O")
    PvBot,
}

impl GameMode {
    pub fn bot_color(self) -> Option<Stone> {
        match self {
            GameMode::PvP => None,
            GameMode::PvBot => Some(Stone::White),
        }
    }
}

/// The bot is to move; ask the suggestion service to answer `last_move`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotRequest {
    pub last_move: Pos,
}

/// Live match
#[derive(Debug, Clone)]
pub struct LiveGame {
    state: GameState,
    mode: GameMode,
    awaiting_bot: bool,
}

impl LiveGame {
    pub fn new(mode: GameMode, size: usize) -> Self {
        Self {
            state: GameState::new(size),
            mode,
            awaiting_bot: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn board(&self) -> &Board {
        self.state.board()
    }

    pub fn current_turn(&self) -> Stone {
        self.state.current_turn()
    }

    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn win_line(&self) -> Option<&WinLine> {
        self.state.win_line()
    }

    pub fn move_log(&self) -> &MoveLog {
        self.state.move_log()
    }

    pub fn last_move(&self) -> Option<Pos> {
        self.state.last_move()
    }

    /// Check if it's the bot's turn
    pub fn is_bot_turn(&self) -> bool {
        !self.state.is_over() && self.mode.bot_color() == Some(self.state.current_turn())
    }

    /// A bot request has been handed out and not yet answered
    pub fn awaiting_bot(&self) -> bool {
        self.awaiting_bot
    }

    /// Apply a move for whichever side is to move. Shared by human and bot.
    pub fn apply_move(&mut self, pos: Pos) -> MoveOutcome {
        self.state.apply_move(pos)
    }

    /// A click from the human player. Ignored during the bot's turn.
    pub fn play_human(&mut self, pos: Pos) -> MoveOutcome {
        if self.is_bot_turn() || self.awaiting_bot {
            return MoveOutcome::Ignored(Ignored::NotYourTurn);
        }
        self.apply_move(pos)
    }

    /// The pending bot request, if the bot is to move and none is outstanding
    pub fn bot_request(&self) -> Option<BotRequest> {
        if self.awaiting_bot || !self.is_bot_turn() {
            return None;
        }
        self.state.last_move().map(|last_move| BotRequest { last_move })
    }

    /// Hand out the bot request and block human input until it is answered
    pub fn begin_bot_request(&mut self) -> Option<BotRequest> {
        let request = self.bot_request()?;
        self.awaiting_bot = true;
        Some(request)
    }

    /// Feed the suggestion service's answer back in.
    ///
    /// A failed request leaves the game untouched and returns the error for
    /// the caller to show.
    pub fn finish_bot_request(
        &mut self,
        reply: Result<Pos, CollaboratorError>,
    ) -> Result<MoveOutcome, CollaboratorError> {
        if !self.awaiting_bot {
            return Ok(MoveOutcome::Ignored(Ignored::NotYourTurn));
        }
        self.awaiting_bot = false;

        match reply {
            Ok(pos) => {
                let outcome = self.apply_move(pos);
                if outcome.is_ignored() {
                    warn!(%pos, ?outcome, "bot reply rejected");
                }
                Ok(outcome)
            }
            Err(err) => {
                warn!(%err, "bot move request failed");
                Err(err)
            }
        }
    }

    /// Request and apply the bot's move synchronously
    pub fn play_bot_turn(
        &mut self,
        suggester: &mut dyn MoveSuggester,
    ) -> Result<MoveOutcome, CollaboratorError> {
        let Some(request) = self.begin_bot_request() else {
            return Ok(MoveOutcome::Ignored(Ignored::NotYourTurn));
        };
        let reply = suggester.suggest_move(request.last_move);
        self.finish_bot_request(reply)
    }

    /// Start over with an empty board, Black to move
    pub fn reset(&mut self) {
        self.state.reset();
        self.awaiting_bot = false;
    }

    /// Reset, and in bot mode restart the bot session (stop, then start).
    ///
    /// Session failures are returned for display; the reset itself always
    /// happens.
    pub fn reset_with_session<S>(&mut self, session: &mut S) -> Vec<CollaboratorError>
    where
        S: SessionService + ?Sized,
    {
        self.reset();
        self.restart_session(session)
    }

    /// Stop, then start the bot session. No-op outside bot mode.
    ///
    /// Split from [`LiveGame::reset_with_session`] for callers that can only
    /// reach the session once an outstanding request has let go of it.
    pub fn restart_session<S>(&self, session: &mut S) -> Vec<CollaboratorError>
    where
        S: SessionService + ?Sized,
    {
        let mut errors = Vec::new();
        if self.mode != GameMode::PvBot {
            return errors;
        }
        if let Err(err) = session.stop_session() {
            warn!(%err, "failed to stop bot session");
            errors.push(err);
        }
        match session.start_session() {
            Ok(()) => info!("bot session restarted"),
            Err(err) => {
                warn!(%err, "failed to start bot session");
                errors.push(err);
            }
        }
        errors
    }

    /// Package the match for persistence
    pub fn to_record(&self, name: &str) -> GameRecord {
        let winning_cells = self.win_line().map(WinLine::cells).unwrap_or_default();
        GameRecord::new(name, self.move_log().as_slice(), winning_cells)
    }

    /// Save the match under `name`. Meant for finished games; not enforced here.
    pub fn save(&self, name: &str, store: &mut dyn RecordStore) -> Result<String, CollaboratorError> {
        let record = self.to_record(name);
        match store.save(&record) {
            Ok(id) => {
                info!(match_name = name, id = %id, moves = record.move_list.len(), "match saved");
                Ok(id)
            }
            Err(err) => {
                warn!(match_name = name, %err, "failed to save match");
                Err(err)
            }
        }
    }
}

impl Default for LiveGame {
    fn default() -> Self {
        Self::new(GameMode::default(), crate::board::DEFAULT_BOARD_SIZE)
    }
}
