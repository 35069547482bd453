//! Win condition checking
//!
//! A player wins with five or more stones in an unbroken line. Overlines
//! count. Only lines through the most recently placed stone can be new, so
//! detection scans the four directions through that one cell.

use crate::board::{Board, Pos, Stone};

/// Stones in a row needed to win
pub const WIN_CONDITION: usize = 5;

/// Line directions through a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
    /// Top-left to bottom-right
    DiagonalDown,
    /// Bottom-left to top-right
    DiagonalUp,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalDown,
        Direction::DiagonalUp,
    ];

    /// (row, col) step for the positive sense of this direction
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::DiagonalDown => (1, 1),
            Direction::DiagonalUp => (-1, 1),
        }
    }
}

/// A winning run of stones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinLine {
    player: Stone,
    direction: Direction,
    cells: Vec<Pos>,
}

impl WinLine {
    /// Build a line from already-known cells (e.g. a saved record)
    pub fn new(player: Stone, direction: Direction, cells: Vec<Pos>) -> Self {
        Self {
            player,
            direction,
            cells,
        }
    }

    pub fn player(&self) -> Stone {
        self.player
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Participating cells: the placed stone first, then the run in the
    /// positive direction, then the run in the negative direction.
    pub fn cells(&self) -> &[Pos] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }
}

/// Detect a win created by `player`'s stone at `pos`.
///
/// Returns `None` if `pos` does not hold a `player` stone.
pub fn detect_win(board: &Board, pos: Pos, player: Stone) -> Option<WinLine> {
    if player == Stone::Empty || board.get(pos) != player {
        return None;
    }

    for direction in Direction::ALL {
        let (dr, dc) = direction.delta();
        let mut cells = vec![pos];
        collect_run(board, pos, player, dr, dc, &mut cells);
        collect_run(board, pos, player, -dr, -dc, &mut cells);

        if cells.len() >= WIN_CONDITION {
            return Some(WinLine::new(player, direction, cells));
        }
    }
    None
}

/// Fast five-in-a-row check at a specific position.
#[inline]
pub fn has_five_at_pos(board: &Board, pos: Pos, color: Stone) -> bool {
    detect_win(board, pos, color).is_some()
}

/// Append contiguous `player` stones starting one step away from `from`.
fn collect_run(board: &Board, from: Pos, player: Stone, dr: i32, dc: i32, cells: &mut Vec<Pos>) {
    let size = board.size();
    let mut distance = 1;
    while let Some(next) = from.offset(dr, dc, distance, size) {
        if board.get(next) != player {
            break;
        }
        cells.push(next);
        distance += 1;
    }
}
