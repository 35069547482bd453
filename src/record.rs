//! Saved match records
//!
//! Wire format shared with the record store:
//!
//! ```json
//! {
//!   "nameMatch": "friday final",
//!   "moveList": [{ "x": 7, "y": 7, "symbol": "X" }],
//!   "winningCells": [[7, 7], [7, 8]],
//!   "timeSaved": "2026-10-16T12:00:00Z"
//! }
//! ```
//!
//! `x` is the row and `y` the column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{Pos, Stone};
use crate::game::Move;

/// Player symbol as stored in records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn stone(self) -> Stone {
        match self {
            Symbol::X => Stone::Black,
            Symbol::O => Stone::White,
        }
    }

    /// `None` for `Stone::Empty`
    pub fn from_stone(stone: Stone) -> Option<Symbol> {
        match stone {
            Stone::Black => Some(Symbol::X),
            Stone::White => Some(Symbol::O),
            Stone::Empty => None,
        }
    }
}

/// One stored move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub x: u8,
    pub y: u8,
    pub symbol: Symbol,
}

impl MoveRecord {
    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    pub fn to_move(&self) -> Move {
        Move::new(self.pos(), self.symbol.stone())
    }

    pub fn from_move(mv: &Move) -> Option<Self> {
        Some(Self {
            x: mv.pos.row,
            y: mv.pos.col,
            symbol: Symbol::from_stone(mv.stone)?,
        })
    }
}

/// A finished match as handed to and returned by the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub name_match: String,
    #[serde(default)]
    pub move_list: Vec<MoveRecord>,
    #[serde(default)]
    pub winning_cells: Vec<[u8; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_saved: Option<DateTime<Utc>>,
}

impl GameRecord {
    pub fn new(name: impl Into<String>, moves: &[Move], winning_cells: &[Pos]) -> Self {
        Self {
            name_match: name.into(),
            move_list: moves.iter().filter_map(MoveRecord::from_move).collect(),
            winning_cells: winning_cells.iter().map(|p| [p.row, p.col]).collect(),
            time_saved: None,
        }
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.move_list.iter().map(MoveRecord::to_move)
    }

    pub fn winning_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.winning_cells.iter().map(|&[r, c]| Pos::new(r, c))
    }
}

/// Entry in the saved-match listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    /// Store-specific key passed back to `RecordStore::load`
    pub id: String,
    pub name: String,
    pub time_saved: Option<DateTime<Utc>>,
}
