//! Step-through playback of a saved match
//!
//! Moves come from finished games and are trusted: they are applied without
//! turn or win checks. The board always equals the first `cursor + 1` moves
//! applied in order.

use std::collections::HashSet;

use tracing::debug;

use super::Move;
use crate::board::{Board, Pos};
use crate::error::ReplayError;
use crate::record::GameRecord;

/// Playback state for one saved match
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    name: String,
    moves: Vec<Move>,
    winning_cells: Vec<Pos>,
    board: Board,
    /// Number of moves currently on the board (cursor + 1)
    applied: usize,
    move_highlight: Option<Pos>,
    win_highlighted: bool,
}

impl ReplayEngine {
    /// Build a replay from a record. Fails if any cell lies off the board or
    /// a cell is played twice.
    pub fn new(record: &GameRecord, size: usize) -> Result<Self, ReplayError> {
        let board = Board::new(size);

        let moves: Vec<Move> = record.moves().collect();
        if let Some(bad) = moves.iter().find(|m| !board.contains(m.pos)) {
            return Err(ReplayError::MissingReplayData(format!(
                "move at {} is outside the {size}x{size} board",
                bad.pos
            )));
        }

        let mut played = HashSet::new();
        if let Some(dup) = moves.iter().find(|m| !played.insert(m.pos)) {
            return Err(ReplayError::MissingReplayData(format!(
                "cell {} is played twice",
                dup.pos
            )));
        }

        let winning_cells: Vec<Pos> = record.winning_positions().collect();
        if let Some(bad) = winning_cells.iter().find(|&&p| !board.contains(p)) {
            return Err(ReplayError::MissingReplayData(format!(
                "winning cell {bad} is outside the {size}x{size} board"
            )));
        }

        debug!(name = %record.name_match, moves = moves.len(), "replay loaded");
        Ok(Self {
            name: record.name_match.clone(),
            moves,
            winning_cells,
            board,
            applied: 0,
            move_highlight: None,
            win_highlighted: false,
        })
    }

    /// Build a replay from the serialized record handed over by the listing
    /// screen. `None` means nothing was selected.
    pub fn from_payload(payload: Option<&str>, size: usize) -> Result<Self, ReplayError> {
        let payload = payload
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ReplayError::MissingReplayData("no game selected".to_string()))?;
        let record: GameRecord = serde_json::from_str(payload)
            .map_err(|e| ReplayError::MissingReplayData(format!("unreadable record: {e}")))?;
        Self::new(&record, size)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Index of the last applied move, `None` before the first
    pub fn current_move_index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn current_move(&self) -> Option<&Move> {
        self.current_move_index().and_then(|i| self.moves.get(i))
    }

    pub fn can_step_forward(&self) -> bool {
        self.applied < self.moves.len()
    }

    pub fn can_step_backward(&self) -> bool {
        self.applied > 0
    }

    /// Cell of the most recent move on the board
    pub fn move_highlight(&self) -> Option<Pos> {
        self.move_highlight
    }

    /// Winning cells, once the final move is on the board
    pub fn highlighted_win(&self) -> &[Pos] {
        if self.win_highlighted {
            &self.winning_cells
        } else {
            &[]
        }
    }

    pub fn is_highlighted(&self, pos: Pos) -> bool {
        self.move_highlight == Some(pos) || self.highlighted_win().contains(&pos)
    }

    /// Apply the next move. Returns `false` at the end of the log.
    pub fn step_forward(&mut self) -> bool {
        let Some(&mv) = self.moves.get(self.applied) else {
            return false;
        };
        // Cells are distinct (checked in `new`), so this cannot clash
        if let Err(err) = self.board.place(mv.pos, mv.stone) {
            debug!(%err, index = self.applied, "replayed move clashes with board");
        }
        self.applied += 1;
        self.move_highlight = Some(mv.pos);

        if self.applied == self.moves.len() && !self.winning_cells.is_empty() {
            self.win_highlighted = true;
        }
        true
    }

    /// Take back the current move. Returns `false` before the first move.
    pub fn step_backward(&mut self) -> bool {
        let Some(index) = self.current_move_index() else {
            return false;
        };
        self.board.remove_stone(self.moves[index].pos);
        self.move_highlight = None;
        self.win_highlighted = false;
        self.applied -= 1;

        if let Some(prev) = self.current_move() {
            self.move_highlight = Some(prev.pos);
        }
        true
    }

    /// Rewind to the empty board
    pub fn rewind(&mut self) {
        while self.step_backward() {}
    }

    /// Play every remaining move
    pub fn fast_forward(&mut self) {
        while self.step_forward() {}
    }

    /// Progress line, e.g. `Move 3/9: Player X at (7, 8)`
    pub fn move_info(&self) -> String {
        match self.current_move() {
            Some(mv) => format!(
                "Move {}/{}: Player {} at ({}, {})",
                self.applied,
                self.moves.len(),
                mv.stone.symbol(),
                mv.pos.row,
                mv.pos.col
            ),
            None => format!("Move 0/{}", self.moves.len()),
        }
    }
}
