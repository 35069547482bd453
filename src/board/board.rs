//! Square grid of stones

use std::fmt;

use super::{Pos, Stone, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
use crate::error::BoardError;

/// Game board. Knows nothing about turns or players beyond cell contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Stone>,
}

impl Board {
    /// Create an empty `size` x `size` board
    pub fn new(size: usize) -> Self {
        let size = size.clamp(1, MAX_BOARD_SIZE);
        Self {
            size,
            cells: vec![Stone::Empty; size * size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check whether a position lies on this board
    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        (pos.row as usize) < self.size && (pos.col as usize) < self.size
    }

    /// Get stone at position (`Empty` when off the board)
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.contains(pos) {
            self.cells[pos.to_index(self.size)]
        } else {
            Stone::Empty
        }
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.get(pos) == Stone::Empty
    }

    /// Place a stone on an empty cell.
    ///
    /// Rejected placements leave the board untouched. Placing `Stone::Empty`
    /// is a no-op.
    pub fn place(&mut self, pos: Pos, stone: Stone) -> Result<(), BoardError> {
        if !self.contains(pos) {
            return Err(BoardError::OutOfBounds {
                row: pos.row,
                col: pos.col,
                size: self.size,
            });
        }
        let idx = pos.to_index(self.size);
        if self.cells[idx] != Stone::Empty {
            return Err(BoardError::CellOccupied {
                row: pos.row,
                col: pos.col,
            });
        }
        if stone != Stone::Empty {
            self.cells[idx] = stone;
        }
        Ok(())
    }

    /// Remove a stone. Off-board positions are ignored.
    #[inline]
    pub fn remove_stone(&mut self, pos: Pos) {
        if self.contains(pos) {
            let idx = pos.to_index(self.size);
            self.cells[idx] = Stone::Empty;
        }
    }

    /// Total stones on board
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|&&s| s != Stone::Empty).count()
    }

    /// Check if board is empty
    pub fn is_board_empty(&self) -> bool {
        self.cells.iter().all(|&s| s == Stone::Empty)
    }

    /// No empty cell left
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&s| s != Stone::Empty)
    }

    /// Iterate over occupied cells in row-major order
    pub fn stones(&self) -> impl Iterator<Item = (Pos, Stone)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &s)| s != Stone::Empty)
            .map(move |(idx, &s)| (Pos::from_index(idx, size), s))
    }

    /// First empty cell in row-major order
    pub fn first_empty(&self) -> Option<Pos> {
        self.cells
            .iter()
            .position(|&s| s == Stone::Empty)
            .map(|idx| Pos::from_index(idx, self.size))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in 0..self.size {
            write!(f, "{:3}", c)?;
        }
        writeln!(f)?;

        for r in 0..self.size {
            write!(f, "{:3}", r)?;
            for c in 0..self.size {
                let ch = match self.get(Pos::new(r as u8, c as u8)) {
                    Stone::Black => "  X",
                    Stone::White => "  O",
                    Stone::Empty => "  .",
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
