//! Free-style Gomoku with a bot opponent and match replays
//!
//! - Board of configurable size (15x15 by default)
//! - Five or more in a row wins, Black ("X") moves first
//! - Human vs human on one screen, or human vs a bot playing White
//! - Finished matches can be saved and stepped through again
//!
//! # Architecture
//!
//! - [`board`]: Board grid, stones and positions
//! - [`rules`]: Win detection around the last placed stone
//! - [`game`]: Live game engine and replay engine
//! - [`record`]: Saved match format
//! - [`service`]: Bot and record store collaborators
//! - [`config`]: TOML configuration
//! - [`ui`]: egui front end
//!
//! # Quick Start
//!
//! ```
//! use gomoku::{GameMode, LiveGame, MoveOutcome, Pos, Stone};
//!
//! let mut game = LiveGame::new(GameMode::PvP, 15);
//! for col in 0..4 {
//!     game.apply_move(Pos::new(7, col));
//!     game.apply_move(Pos::new(8, col));
//! }
//! let outcome = game.apply_move(Pos::new(7, 4));
//! assert_eq!(outcome, MoveOutcome::Won { winner: Stone::Black });
//! assert_eq!(game.win_line().map(|line| line.len()), Some(5));
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod record;
pub mod rules;
pub mod service;
pub mod ui;

// Re-export commonly used types for convenience
pub use board::{Board, Pos, Stone, DEFAULT_BOARD_SIZE};
pub use error::{BoardError, CollaboratorError, ConfigError, ReplayError};
pub use game::{GameMode, GameState, GameStatus, LiveGame, MoveOutcome, ReplayEngine};
pub use record::GameRecord;
pub use rules::{detect_win, WinLine};
