//! Game rules for five-in-a-row
//!
//! Free-style rules: five or more in a row wins, no forbidden moves.

pub mod win;

// Re-exports for convenient access
pub use win::{detect_win, has_five_at_pos, Direction, WinLine, WIN_CONDITION};
