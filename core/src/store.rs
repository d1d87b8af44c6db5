use serde::{Deserialize, Serialize};

use crate::{Cell, CellColor, CellIndex};

/// One persisted board cell. Decoded from the store's stringly row
/// representation at the gateway boundary; the engine only ever sees
/// this fixed shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRow {
    /// Cell index the row mirrors; primary key in the store.
    pub id: i64,
    pub color: CellColor,
    pub is_busy: bool,
}

/// The single persisted session row holding the running score.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRow {
    pub id: i64,
    pub score: i64,
}

/// Durable mirror of the board: one row per cell plus a single score row.
///
/// Persistence is best-effort. Implementations log failures and degrade
/// to `false` or an empty sequence; the in-memory board stays the source
/// of truth, so the engine never branches on these return values.
pub trait BoardStore {
    /// All cell rows, or empty when the table is empty or the read failed.
    fn read_positions(&mut self) -> Vec<PositionRow>;

    /// All session-info rows; the engine uses the first one.
    fn read_info(&mut self) -> Vec<InfoRow>;

    fn insert_position(&mut self, id: CellIndex, cell: &Cell) -> bool;

    /// Inserts the session row with a zero score.
    fn insert_info(&mut self, id: i64) -> bool;

    fn update_position(&mut self, id: CellIndex, cell: &Cell) -> bool;

    fn update_score(&mut self, id: i64, score: u32) -> bool;

    fn clear_positions(&mut self) -> bool;

    fn clear_info(&mut self) -> bool;
}

/// A gateway that remembers nothing. Lets the engine run, and be
/// observed in tests, without a live store behind it.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullStore;

impl BoardStore for NullStore {
    fn read_positions(&mut self) -> Vec<PositionRow> {
        Vec::new()
    }

    fn read_info(&mut self) -> Vec<InfoRow> {
        Vec::new()
    }

    fn insert_position(&mut self, _id: CellIndex, _cell: &Cell) -> bool {
        true
    }

    fn insert_info(&mut self, _id: i64) -> bool {
        true
    }

    fn update_position(&mut self, _id: CellIndex, _cell: &Cell) -> bool {
        true
    }

    fn update_score(&mut self, _id: i64, _score: u32) -> bool {
        true
    }

    fn clear_positions(&mut self) -> bool {
        true
    }

    fn clear_info(&mut self) -> bool {
        true
    }
}
