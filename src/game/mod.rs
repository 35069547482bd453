//! Match state: move log, live play and replay
//!
//! - [`GameState`]: board, turn, status and move log; mutated only by
//!   [`GameState::apply_move`]
//! - [`LiveGame`]: turn order, bot turns, reset and saving around a `GameState`
//! - [`ReplayEngine`]: reversible step-through of a saved move log

pub mod live;
pub mod replay;
pub mod state;

pub use live::{BotRequest, GameMode, LiveGame};
pub use replay::ReplayEngine;
pub use state::GameState;

use crate::board::{Pos, Stone};
use crate::error::BoardError;

/// A single stone placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub pos: Pos,
    pub stone: Stone,
}

impl Move {
    pub fn new(pos: Pos, stone: Stone) -> Self {
        Self { pos, stone }
    }
}

/// Moves in the order they were played
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveLog {
    moves: Vec<Move>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub(crate) fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }
}

impl<'a> IntoIterator for &'a MoveLog {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won(Stone),
    Draw,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Why a move was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    GameOver,
    NotYourTurn,
    Board(BoardError),
}

/// Result of offering a move to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Stone placed, game continues with `next` to move
    Placed { next: Stone },
    Won { winner: Stone },
    Draw,
    /// Nothing changed
    Ignored(Ignored),
}

impl MoveOutcome {
    pub fn is_ignored(self) -> bool {
        matches!(self, MoveOutcome::Ignored(_))
    }
}
