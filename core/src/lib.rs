//! Board engine for a "Color Lines" puzzle: a 9×9 grid on which the
//! player moves colored pieces along free-cell paths and clears lines of
//! five matching colors, while the computer drops three random pieces
//! each turn until the board fills.
//!
//! The engine owns the grid, the two-click move state machine, win
//! detection and scoring, and mirrors every mutation to a [`BoardStore`].
//! Rendering and input translation live outside this crate and talk to
//! [`GameBoard`] through its queries, commands, and drained
//! [`BoardEvent`]s.

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use store::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod event;
mod store;
mod types;

/// Grid geometry and scoring constants, exposed for adapter layout.
pub const ROWS: usize = 9;
pub const COLS: usize = 9;
pub const BOARD_SIZE: usize = ROWS * COLS;
/// Length of a scoring run of same-colored cells.
pub const WIN_LENGTH: usize = 5;
/// Points awarded per cleared line.
pub const POINTS_PER_LINE: u32 = 10;
/// Number of playable piece colors.
pub const COLOR_COUNT: u8 = 4;
/// Pieces the computer places per turn, free cells permitting.
pub const COMPUTER_PIECES_PER_TURN: usize = 3;

/// Outcome of picking up a piece with the first click of a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// The piece was recorded as the pending move source.
    Picked,
    /// The cell was free, or a move was already in flight.
    Rejected,
}

impl PickOutcome {
    pub const fn accepted(self) -> bool {
        matches!(self, Self::Picked)
    }
}

/// Outcome of dropping the pending piece with the second click.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The piece moved; the caller should follow up with
    /// [`GameBoard::finish_turn`].
    Moved,
    /// No move was pending, the target was busy, or no free-cell path
    /// reaches it. Any pending move is cleared either way.
    Rejected,
}

impl MoveOutcome {
    pub const fn accepted(self) -> bool {
        matches!(self, Self::Moved)
    }
}
