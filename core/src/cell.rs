use serde::{Deserialize, Serialize};

/// Piece color of a cell. `Colorless` marks a cell with no piece on it;
/// the four playable colors carry the persisted ids `1..=4`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellColor {
    Colorless,
    Red,
    Green,
    Blue,
    Yellow,
}

impl CellColor {
    /// Integer id used by the persistence layer.
    pub const fn id(self) -> u8 {
        match self {
            Self::Colorless => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Blue => 3,
            Self::Yellow => 4,
        }
    }

    /// Inverse of [`CellColor::id`]; unknown ids decode as `Colorless`.
    pub const fn from_id(id: i64) -> Self {
        match id {
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Blue,
            4 => Self::Yellow,
            _ => Self::Colorless,
        }
    }

    /// Lowercase color name for presentation adapters, empty for `Colorless`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Colorless => "",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
        }
    }

    pub const fn is_playable(self) -> bool {
        !matches!(self, Self::Colorless)
    }
}

impl Default for CellColor {
    fn default() -> Self {
        Self::Colorless
    }
}

/// One grid position's color and occupancy. Consumers read copies;
/// mutation goes through the board engine only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    color: CellColor,
    is_busy: bool,
}

impl Cell {
    /// An unoccupied, colorless cell.
    pub const fn free() -> Self {
        Self {
            color: CellColor::Colorless,
            is_busy: false,
        }
    }

    /// A cell holding a piece of the given color.
    pub const fn occupied(color: CellColor) -> Self {
        Self {
            color,
            is_busy: true,
        }
    }

    pub const fn color(self) -> CellColor {
        self.color
    }

    pub const fn is_busy(self) -> bool {
        self.is_busy
    }

    /// Drops the piece but keeps the last color, mirroring how cleared
    /// cells are persisted.
    pub(crate) const fn cleared(self) -> Self {
        Self {
            color: self.color,
            is_busy: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_ids_round_trip() {
        for color in [
            CellColor::Colorless,
            CellColor::Red,
            CellColor::Green,
            CellColor::Blue,
            CellColor::Yellow,
        ] {
            assert_eq!(CellColor::from_id(color.id() as i64), color);
        }
    }

    #[test]
    fn unknown_ids_decode_as_colorless() {
        assert_eq!(CellColor::from_id(-1), CellColor::Colorless);
        assert_eq!(CellColor::from_id(99), CellColor::Colorless);
    }

    #[test]
    fn cleared_cell_keeps_its_color() {
        let cell = Cell::occupied(CellColor::Blue).cleared();
        assert!(!cell.is_busy());
        assert_eq!(cell.color(), CellColor::Blue);
    }
}
