use std::collections::{BTreeSet, VecDeque};

use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::*;

/// Id of the single session-info row.
const INFO_ROW_ID: i64 = 0;

/// The 9×9 Color Lines board.
///
/// Owns the grid, the free-cell set, the two-click move state machine,
/// win detection and scoring, and the computer turn. Every mutation is
/// mirrored to the injected [`BoardStore`] and queued as a
/// [`BoardEvent`]; the randomness of computer placements comes from an
/// injected seeded generator so games replay deterministically.
#[derive(Debug)]
pub struct GameBoard<S> {
    grid: Array2<Cell>,
    free_cells: BTreeSet<CellIndex>,
    current_score: u32,
    is_final: bool,
    pending_from: Option<CellIndex>,
    rng: SmallRng,
    store: S,
    events: VecDeque<BoardEvent>,
}

impl<S: BoardStore> GameBoard<S> {
    /// An all-empty board. Call [`GameBoard::refresh`] or
    /// [`GameBoard::new_game`] to start playing.
    pub fn new(store: S, seed: u64) -> Self {
        Self {
            grid: Array2::default((ROWS, COLS)),
            free_cells: (0..BOARD_SIZE).collect(),
            current_score: 0,
            is_final: false,
            pending_from: None,
            rng: SmallRng::seed_from_u64(seed),
            store,
            events: VecDeque::new(),
        }
    }

    /// Snapshot of the cell at `index`.
    ///
    /// `index` must be within `0..cell_count()`; adapters iterate the
    /// fixed grid, so an out-of-range index is a caller bug and panics.
    /// The move commands validate indices instead, since those arrive
    /// from raw input.
    pub fn cell_at(&self, index: CellIndex) -> Cell {
        self.grid[to_coords(index)]
    }

    pub const fn cell_count(&self) -> usize {
        BOARD_SIZE
    }

    pub const fn current_score(&self) -> u32 {
        self.current_score
    }

    pub const fn is_final(&self) -> bool {
        self.is_final
    }

    /// Drains the change notifications queued since the last drain, in
    /// mutation order.
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        self.events.drain(..).collect()
    }

    /// Starts a fresh session: persisted state is wiped and re-seeded,
    /// the grid rebuilt empty, then the computer opens with its turn.
    pub fn new_game(&mut self) {
        log::debug!("starting a new game");
        self.store.clear_info();
        self.store.clear_positions();
        self.store.insert_info(INFO_ROW_ID);
        self.fill_board_empty_cells();
        self.set_score(0);
        self.set_final(false);
        self.computer_move();
    }

    /// Hydrates the board and score from the store; when either table
    /// is empty this falls back to [`GameBoard::new_game`]. Win lines
    /// are not re-checked retroactively, only the terminal flag is
    /// recomputed from the loaded free-cell count.
    pub fn refresh(&mut self) {
        if self.try_fill_board_from_store() && self.try_fill_info_from_store() {
            log::debug!("restored previous session, score {}", self.current_score);
            self.set_final(self.free_cells.is_empty());
            return;
        }
        self.new_game();
    }

    /// Clears every occupied cell in place, zeroes the score, and lets
    /// the computer open. The persisted schema is left untouched; the
    /// computer placements and score write re-sync the store.
    pub fn reset_board(&mut self) {
        for index in 0..BOARD_SIZE {
            if self.cell_at(index).is_busy() {
                self.free_cells.insert(index);
            }
            self.grid[to_coords(index)] = Cell::free();
        }
        self.events.push_back(BoardEvent::BoardReset);
        self.set_score(0);
        self.computer_move();
    }

    /// First click of a move: picks up the piece at `index` as the
    /// pending source. Rejected when the cell is free or another move
    /// is already pending.
    pub fn begin_move(&mut self, index: CellIndex) -> Result<PickOutcome> {
        let index = check_index(index)?;

        if self.pending_from.is_none() && self.cell_at(index).is_busy() {
            self.pending_from = Some(index);
            Ok(PickOutcome::Picked)
        } else {
            Ok(PickOutcome::Rejected)
        }
    }

    /// Second click of a move: drops the pending piece on `index`.
    /// Rejected when nothing is pending, the target is busy, or no
    /// free-cell path connects source and target; the pending move is
    /// cleared after every attempt.
    pub fn complete_move(&mut self, index: CellIndex) -> Result<MoveOutcome> {
        let index = check_index(index)?;

        let Some(from) = self.pending_from.take() else {
            return Ok(MoveOutcome::Rejected);
        };

        if self.cell_at(index).is_busy() || !self.has_free_path(from, index) {
            return Ok(MoveOutcome::Rejected);
        }

        self.move_cell(from, index);
        Ok(MoveOutcome::Moved)
    }

    /// Ends the player's turn after a successful move to `index`:
    /// applies any win lines through it, then the computer places its
    /// pieces and the terminal state is re-evaluated.
    pub fn finish_turn(&mut self, index: CellIndex) -> Result<()> {
        let index = check_index(index)?;

        self.check_and_apply_win_lines(index);
        self.computer_move();
        Ok(())
    }

    fn fill_board_empty_cells(&mut self) {
        self.free_cells.clear();
        for index in 0..BOARD_SIZE {
            let cell = Cell::free();
            self.grid[to_coords(index)] = cell;
            self.free_cells.insert(index);
            self.store.insert_position(index, &cell);
        }
        self.events.push_back(BoardEvent::BoardReset);
    }

    fn try_fill_board_from_store(&mut self) -> bool {
        let rows = self.store.read_positions();
        if rows.is_empty() {
            return false;
        }

        self.grid.fill(Cell::free());
        self.free_cells = (0..BOARD_SIZE).collect();
        for row in rows {
            let index = match usize::try_from(row.id) {
                Ok(index) if is_valid_index(index) => index,
                _ => {
                    log::warn!("ignoring position row with id {} outside the board", row.id);
                    continue;
                }
            };
            if row.is_busy {
                self.grid[to_coords(index)] = Cell::occupied(row.color);
                self.free_cells.remove(&index);
            }
        }
        self.events.push_back(BoardEvent::BoardReset);
        true
    }

    fn try_fill_info_from_store(&mut self) -> bool {
        let rows = self.store.read_info();
        let Some(info) = rows.first() else {
            return false;
        };
        self.set_score(info.score.max(0) as u32);
        true
    }

    fn set_score(&mut self, new_score: u32) {
        if self.current_score == new_score {
            return;
        }
        self.current_score = new_score;
        self.store.update_score(INFO_ROW_ID, new_score);
        self.events.push_back(BoardEvent::ScoreChanged(new_score));
    }

    fn set_final(&mut self, new_is_final: bool) {
        if self.is_final == new_is_final {
            return;
        }
        self.is_final = new_is_final;
        self.events.push_back(BoardEvent::FinalChanged(new_is_final));
    }

    fn place_cell(&mut self, index: CellIndex, color: CellColor) {
        let cell = Cell::occupied(color);
        self.grid[to_coords(index)] = cell;
        self.free_cells.remove(&index);
        self.store.update_position(index, &cell);
        self.events.push_back(BoardEvent::CellChanged(index));
    }

    fn clear_cell(&mut self, index: CellIndex) {
        let cell = self.cell_at(index).cleared();
        self.grid[to_coords(index)] = cell;
        self.free_cells.insert(index);
        self.store.update_position(index, &cell);
        self.events.push_back(BoardEvent::CellChanged(index));
    }

    fn move_cell(&mut self, from: CellIndex, to: CellIndex) {
        let piece = self.cell_at(from);
        self.grid[to_coords(to)] = piece;
        self.clear_cell(from);
        self.free_cells.remove(&to);
        self.store.update_position(to, &piece);
        self.events.push_back(BoardEvent::CellChanged(to));
    }

    /// Whether a 4-connected path of free cells links `from` and `to`.
    /// Iterative depth-first search with one visited set per call; the
    /// source cell itself may be busy (it holds the moving piece).
    fn has_free_path(&self, from: CellIndex, to: CellIndex) -> bool {
        if from == to {
            return true;
        }

        let mut visited = BTreeSet::from([from]);
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            for neighbor in neighbors(current) {
                if self.cell_at(neighbor).is_busy() {
                    continue;
                }
                if neighbor == to {
                    return true;
                }
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        false
    }

    /// Scans the full row of `index` for the first contiguous run of
    /// [`WIN_LENGTH`] busy cells of `need_color`, returning the run's
    /// first index.
    fn check_hor_line(&self, index: CellIndex, need_color: CellColor) -> Option<CellIndex> {
        let (row, _) = to_coords(index);
        self.check_line((0..COLS).map(move |col| to_index((row, col))), need_color)
    }

    /// Column counterpart of [`GameBoard::check_hor_line`].
    fn check_ver_line(&self, index: CellIndex, need_color: CellColor) -> Option<CellIndex> {
        let (_, col) = to_coords(index);
        self.check_line((0..ROWS).map(move |row| to_index((row, col))), need_color)
    }

    fn check_line(
        &self,
        line: impl Iterator<Item = CellIndex>,
        need_color: CellColor,
    ) -> Option<CellIndex> {
        let mut run_length = 0;
        let mut run_start = None;
        for index in line {
            let cell = self.cell_at(index);
            if cell.is_busy() && cell.color() == need_color {
                if run_start.is_none() {
                    run_start = Some(index);
                }
                run_length += 1;
            } else {
                run_length = 0;
                run_start = None;
            }

            if run_length == WIN_LENGTH {
                return run_start;
            }
        }
        None
    }

    /// Applies the win lines through `index` for that cell's color.
    /// Both directions are checked against the pre-clearing board, so a
    /// horizontal and a vertical line can fire from the same move; each
    /// clears exactly [`WIN_LENGTH`] cells from its run's first index
    /// (a longer run keeps its remainder) and adds
    /// [`POINTS_PER_LINE`] points.
    fn check_and_apply_win_lines(&mut self, index: CellIndex) {
        let need_color = self.cell_at(index).color();
        let ver_start = self.check_ver_line(index, need_color);
        let hor_start = self.check_hor_line(index, need_color);

        if let Some(start) = ver_start {
            self.apply_ver_line(start);
        }
        if let Some(start) = hor_start {
            self.apply_hor_line(start);
        }
    }

    fn apply_hor_line(&mut self, start: CellIndex) {
        self.set_score(self.current_score + POINTS_PER_LINE);
        for index in start..start + WIN_LENGTH {
            self.clear_cell(index);
        }
    }

    fn apply_ver_line(&mut self, start: CellIndex) {
        self.set_score(self.current_score + POINTS_PER_LINE);
        for step in 0..WIN_LENGTH {
            self.clear_cell(start + step * COLS);
        }
    }

    /// Places up to [`COMPUTER_PIECES_PER_TURN`] pieces, each on a
    /// uniformly random free cell with a uniformly random playable
    /// color, then win-checks the placements in order and re-evaluates
    /// the terminal state.
    fn computer_move(&mut self) {
        let placements = COMPUTER_PIECES_PER_TURN.min(self.free_cells.len());
        let mut placed = Vec::with_capacity(placements);
        for _ in 0..placements {
            let step = self.rng.random_range(0..self.free_cells.len());
            let color_id = self.rng.random_range(1..=i64::from(COLOR_COUNT));
            let Some(&index) = self.free_cells.iter().nth(step) else {
                break;
            };
            log::debug!("computer places color {color_id} at {index}");
            self.place_cell(index, CellColor::from_id(color_id));
            placed.push(index);
        }

        for index in placed {
            self.check_and_apply_win_lines(index);
        }
        self.set_final(self.free_cells.is_empty());
    }
}

const fn check_index(index: CellIndex) -> Result<CellIndex> {
    if is_valid_index(index) {
        Ok(index)
    } else {
        Err(GameError::InvalidIndex)
    }
}
