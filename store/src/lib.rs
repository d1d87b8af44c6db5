//! SQLite persistence gateway for the Color Lines board.
//!
//! [`SqliteStore`] mirrors the board into two tables: one row per cell
//! and a single session row with the running score. Persistence is
//! best-effort by design: every operation is one synchronous statement,
//! failures are logged and degrade to `false` or an empty read, and a
//! handle that never opened stays closed. The in-memory board remains
//! the source of truth for the running process.

use std::path::PathBuf;

use colorlines_core::{BoardStore, Cell, CellColor, CellIndex, InfoRow, PositionRow};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params};
use thiserror::Error;

/// On-disk database file name; the schema version is baked into the
/// suffix, so a schema change ships under a new file name.
pub const DB_FILE_NAME: &str = "ColorLinesDB1.db";

const TABLE_POSITIONS: &str = "LastSessionPositions";
const TABLE_INFO: &str = "LastSessionInformation";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The handle is not open; operations fail without trying to reopen.
    #[error("store is not open")]
    Unavailable,
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// A [`BoardStore`] backed by a local SQLite file.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Option<Connection>,
}

impl SqliteStore {
    /// A closed gateway for the given database file. Nothing works
    /// until [`SqliteStore::connect`] succeeds.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: None,
        }
    }

    /// Opens the database file, creating the schema first when the file
    /// does not exist yet.
    pub fn connect(&mut self) -> bool {
        log::debug!("connecting to {}", self.path.display());
        let existed = self.path.exists();
        match self.try_connect(existed) {
            Ok(conn) => {
                self.conn = Some(conn);
                true
            }
            Err(err) => {
                log::error!("connect to {} failed: {err}", self.path.display());
                false
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn try_connect(&self, existed: bool) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        if !existed {
            Self::create_tables(&conn)?;
        }
        Ok(conn)
    }

    fn create_tables(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(&format!(
            "CREATE TABLE {TABLE_POSITIONS} (
                id           INTEGER PRIMARY KEY,
                color_cell   INTEGER NOT NULL,
                is_busy_cell BOOL    NOT NULL
            );
            CREATE TABLE {TABLE_INFO} (
                id           INTEGER PRIMARY KEY,
                score        INTEGER
            );"
        ))?;
        Ok(())
    }

    fn conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Unavailable)
    }

    fn execute(&self, sql: &str, params: impl rusqlite::Params) -> Result<(), StoreError> {
        self.conn()?.execute(sql, params)?;
        Ok(())
    }

    fn try_read_positions(&self) -> Result<Vec<PositionRow>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, color_cell, is_busy_cell FROM {TABLE_POSITIONS}"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PositionRow {
                    id: parse_int(&field_text(row, 0)?),
                    color: CellColor::from_id(parse_int(&field_text(row, 1)?)),
                    is_busy: parse_int(&field_text(row, 2)?) != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn try_read_info(&self) -> Result<Vec<InfoRow>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT id, score FROM {TABLE_INFO}"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(InfoRow {
                    id: parse_int(&field_text(row, 0)?),
                    score: parse_int(&field_text(row, 1)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl BoardStore for SqliteStore {
    fn read_positions(&mut self) -> Vec<PositionRow> {
        match self.try_read_positions() {
            Ok(rows) => rows,
            Err(err) => {
                log::error!("read positions failed: {err}");
                Vec::new()
            }
        }
    }

    fn read_info(&mut self) -> Vec<InfoRow> {
        match self.try_read_info() {
            Ok(rows) => rows,
            Err(err) => {
                log::error!("read info failed: {err}");
                Vec::new()
            }
        }
    }

    fn insert_position(&mut self, id: CellIndex, cell: &Cell) -> bool {
        log_on_error(
            "insert position",
            self.execute(
                &format!(
                    "INSERT INTO {TABLE_POSITIONS} (id, color_cell, is_busy_cell)
                     VALUES (?1, ?2, ?3)"
                ),
                params![id as i64, cell.color().id(), cell.is_busy()],
            ),
        )
    }

    fn insert_info(&mut self, id: i64) -> bool {
        log_on_error(
            "insert info",
            self.execute(
                &format!("INSERT INTO {TABLE_INFO} (id, score) VALUES (?1, 0)"),
                params![id],
            ),
        )
    }

    fn update_position(&mut self, id: CellIndex, cell: &Cell) -> bool {
        log_on_error(
            "update position",
            self.execute(
                &format!(
                    "UPDATE {TABLE_POSITIONS}
                     SET color_cell = ?2, is_busy_cell = ?3 WHERE id = ?1"
                ),
                params![id as i64, cell.color().id(), cell.is_busy()],
            ),
        )
    }

    fn update_score(&mut self, id: i64, score: u32) -> bool {
        log_on_error(
            "update score",
            self.execute(
                &format!("UPDATE {TABLE_INFO} SET score = ?2 WHERE id = ?1"),
                params![id, score],
            ),
        )
    }

    fn clear_positions(&mut self) -> bool {
        log_on_error(
            "clear positions",
            self.execute(&format!("DELETE FROM {TABLE_POSITIONS}"), []),
        )
    }

    fn clear_info(&mut self) -> bool {
        log_on_error(
            "clear info",
            self.execute(&format!("DELETE FROM {TABLE_INFO}"), []),
        )
    }
}

fn log_on_error(what: &str, result: Result<(), StoreError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::error!("{what} failed: {err}");
            false
        }
    }
}

/// Reads one column as its string representation, with the empty string
/// standing in for NULL. Typed rows are decoded from these strings, so
/// the gateway keeps the stringly boundary to itself.
fn field_text(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(index)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        ValueRef::Blob(_) => String::new(),
    })
}

/// Blank or unparsable numerics decode to 0.
fn parse_int(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorlines_core::{BOARD_SIZE, GameBoard};

    fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
        let mut store = SqliteStore::new(dir.path().join(DB_FILE_NAME));
        assert!(store.connect());
        store
    }

    #[test]
    fn connect_creates_schema_and_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        assert!(store.insert_info(0));
        assert!(store.insert_position(0, &Cell::occupied(CellColor::Red)));
        assert!(store.insert_position(1, &Cell::free()));

        let positions = store.read_positions();
        assert_eq!(
            positions,
            vec![
                PositionRow {
                    id: 0,
                    color: CellColor::Red,
                    is_busy: true,
                },
                PositionRow {
                    id: 1,
                    color: CellColor::Colorless,
                    is_busy: false,
                },
            ]
        );
        assert_eq!(store.read_info(), vec![InfoRow { id: 0, score: 0 }]);
    }

    #[test]
    fn updates_overwrite_rows_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        store.insert_info(0);
        store.insert_position(4, &Cell::free());

        assert!(store.update_position(4, &Cell::occupied(CellColor::Blue)));
        assert!(store.update_score(0, 30));

        let positions = store.read_positions();
        assert_eq!(positions[0].color, CellColor::Blue);
        assert!(positions[0].is_busy);
        assert_eq!(store.read_info()[0].score, 30);
    }

    #[test]
    fn clear_empties_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        store.insert_info(0);
        store.insert_position(0, &Cell::occupied(CellColor::Green));

        assert!(store.clear_positions());
        assert!(store.clear_info());

        assert!(store.read_positions().is_empty());
        assert!(store.read_info().is_empty());
    }

    #[test]
    fn operations_fail_silently_when_not_connected() {
        let mut store = SqliteStore::new("/nonexistent/ColorLinesDB1.db");
        assert!(!store.is_open());

        assert!(store.read_positions().is_empty());
        assert!(store.read_info().is_empty());
        assert!(!store.insert_info(0));
        assert!(!store.insert_position(0, &Cell::free()));
        assert!(!store.update_position(0, &Cell::free()));
        assert!(!store.update_score(0, 10));
        assert!(!store.clear_positions());
        assert!(!store.clear_info());
    }

    #[test]
    fn null_score_decodes_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);
        store.insert_info(0);

        let raw = Connection::open(dir.path().join(DB_FILE_NAME)).unwrap();
        raw.execute(
            &format!("UPDATE {TABLE_INFO} SET score = NULL WHERE id = 0"),
            [],
        )
        .unwrap();

        assert_eq!(store.read_info(), vec![InfoRow { id: 0, score: 0 }]);
    }

    #[test]
    fn reconnecting_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = open_store(&dir);
            store.insert_position(7, &Cell::occupied(CellColor::Yellow));
        }

        let mut store = open_store(&dir);
        let positions = store.read_positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].id, 7);
        assert_eq!(positions[0].color, CellColor::Yellow);
    }

    #[test]
    fn board_state_round_trips_through_refresh() {
        let dir = tempfile::tempdir().unwrap();

        let mut board = GameBoard::new(open_store(&dir), 21);
        board.new_game();
        let cells: Vec<Cell> = (0..BOARD_SIZE).map(|index| board.cell_at(index)).collect();

        // bump the persisted score behind the engine's back so the
        // restore has something besides zero to prove
        let raw = Connection::open(dir.path().join(DB_FILE_NAME)).unwrap();
        raw.execute(
            &format!("UPDATE {TABLE_INFO} SET score = 40 WHERE id = 0"),
            [],
        )
        .unwrap();

        let mut restored = GameBoard::new(open_store(&dir), 99);
        restored.refresh();

        assert_eq!(restored.current_score(), 40);
        assert!(!restored.is_final());
        for (index, cell) in cells.iter().enumerate() {
            assert_eq!(restored.cell_at(index).is_busy(), cell.is_busy());
            if cell.is_busy() {
                assert_eq!(restored.cell_at(index).color(), cell.color());
            }
        }
    }
}
