use serde::{Deserialize, Serialize};

use crate::CellIndex;

/// Change notification raised by the board engine, in mutation order.
/// Presentation adapters drain these after each command and re-render
/// only what changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// A single cell changed color or occupancy.
    CellChanged(CellIndex),
    /// The running score changed to the carried value.
    ScoreChanged(u32),
    /// The terminal flag flipped to the carried value.
    FinalChanged(bool),
    /// The whole grid was rebuilt; re-read every cell.
    BoardReset,
}
