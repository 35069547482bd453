//! External collaborators
//!
//! The engine never talks to a network, a process or a disk directly. It is
//! handed implementations of these traits:
//! - [`MoveSuggester`]: the bot's move for the last human move
//! - [`SessionService`]: start/stop of the bot-side session
//! - [`RecordStore`]: save, list and load finished matches

pub mod fallback;
pub mod gomocup;
pub mod store;

pub use fallback::FirstEmptyBot;
pub use gomocup::PbrainEngine;
pub use store::JsonRecordStore;

use crate::board::Pos;
use crate::error::CollaboratorError;
use crate::record::{GameRecord, RecordSummary};

/// Remote move-suggestion service
pub trait MoveSuggester {
    /// Reply to the opponent's `last_move` with the bot's chosen cell
    fn suggest_move(&mut self, last_move: Pos) -> Result<Pos, CollaboratorError>;
}

/// Bot-side session lifecycle. Both calls are best-effort.
pub trait SessionService {
    fn start_session(&mut self) -> Result<(), CollaboratorError>;
    fn stop_session(&mut self) -> Result<(), CollaboratorError>;
}

/// A bot usable from a worker thread
pub trait BotService: MoveSuggester + SessionService + Send {}

impl<T: MoveSuggester + SessionService + Send> BotService for T {}

/// Persistence plus listing/loading of finished matches
pub trait RecordStore {
    /// Store a record, returning its id. The store stamps `time_saved`.
    fn save(&mut self, record: &GameRecord) -> Result<String, CollaboratorError>;

    /// Saved matches, newest first
    fn list(&self) -> Result<Vec<RecordSummary>, CollaboratorError>;

    fn load(&self, id: &str) -> Result<GameRecord, CollaboratorError>;
}
