use crate::{BOARD_SIZE, COLS, ROWS};

/// Flat, row-major cell index into the 9×9 board (`0..81`).
pub type CellIndex = usize;

/// `(row, col)` coordinates of a cell.
pub type Coord2 = (usize, usize);

pub const fn to_coords(index: CellIndex) -> Coord2 {
    (index / COLS, index % COLS)
}

pub const fn to_index((row, col): Coord2) -> CellIndex {
    row * COLS + col
}

pub const fn is_valid_index(index: CellIndex) -> bool {
    index < BOARD_SIZE
}

/// Orthogonal displacements, in the order the engine probes them:
/// right, left, up, down. No diagonal steps and no wraparound.
const DISPLACEMENTS: [(isize, isize); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize)) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = delta;

    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= ROWS {
        return None;
    }

    let next_col = col.checked_add_signed(d_col)?;
    if next_col >= COLS {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterates the up-to-four orthogonal neighbors of a cell.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    index: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: CellIndex) -> Self {
        Self {
            center: to_coords(center),
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = CellIndex;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item = apply_delta(self.center, DISPLACEMENTS[self.index as usize]);
            self.index += 1;

            if let Some(coords) = next_item {
                return Some(to_index(coords));
            }
        }
    }
}

/// Orthogonal neighbors of `index`, edge-aware.
pub fn neighbors(index: CellIndex) -> NeighborIter {
    NeighborIter::new(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_round_trip() {
        for index in 0..BOARD_SIZE {
            assert_eq!(to_index(to_coords(index)), index);
        }
    }

    #[test]
    fn corner_has_two_neighbors() {
        let found: Vec<_> = neighbors(0).collect();
        assert_eq!(found, vec![1, COLS]);
    }

    #[test]
    fn center_has_four_neighbors() {
        let center = to_index((4, 4));
        let found: Vec<_> = neighbors(center).collect();
        assert_eq!(
            found,
            vec![
                to_index((4, 5)),
                to_index((4, 3)),
                to_index((3, 4)),
                to_index((5, 4)),
            ]
        );
    }

    #[test]
    fn row_edges_do_not_wrap() {
        // index 8 is the last cell of row 0, index 9 the first of row 1
        let right_edge: Vec<_> = neighbors(8).collect();
        assert!(!right_edge.contains(&9));
        let left_edge: Vec<_> = neighbors(9).collect();
        assert!(!left_edge.contains(&8));
    }
}
