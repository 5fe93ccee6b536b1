//! SQLite-backed pattern table.
//!
//! A single database file holds table `pii_patterns`. The connection is
//! opened (and the schema applied) on the first operation after a
//! `disconnect`, and closed again by `disconnect`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, params_from_iter, Connection, Row};

use piisync_core::{PatternName, PatternRecord, StoredPattern};

use crate::error::{io_err, StoreError};
use crate::store::PatternStore;

/// DDL for the pattern table. `IF NOT EXISTS` keeps it idempotent.
pub(crate) const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS pii_patterns (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT    NOT NULL UNIQUE,
    regex_pattern TEXT    NOT NULL,
    sensitive     INTEGER NOT NULL,
    on_key        INTEGER NOT NULL
);
"#;

pub struct SqlitePatternStore {
    path: PathBuf,
    busy_timeout: Duration,
    conn: Option<Connection>,
    in_transaction: bool,
}

impl SqlitePatternStore {
    /// A store for the database at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
            conn: None,
            in_transaction: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn open(&self) -> Result<Connection, StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch(SCHEMA_SQL)?;
        tracing::debug!("opened pattern database at {}", self.path.display());
        Ok(conn)
    }

    fn conn(&mut self) -> Result<&Connection, StoreError> {
        if self.conn.is_none() {
            self.conn = Some(self.open()?);
        }
        self.conn
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("connection not open".to_string()))
    }
}

impl PatternStore for SqlitePatternStore {
    fn find_many(&mut self) -> Result<Vec<StoredPattern>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, regex_pattern, sensitive, on_key FROM pii_patterns ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_pattern)?;

        let mut patterns = Vec::new();
        for row in rows {
            patterns.push(row?);
        }
        Ok(patterns)
    }

    fn delete_many(&mut self, ids: &[i64]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM pii_patterns WHERE id IN ({placeholders})");
        let conn = self.conn()?;
        Ok(conn.execute(&sql, params_from_iter(ids.iter()))?)
    }

    fn update_many(
        &mut self,
        name: &PatternName,
        data: &PatternRecord,
    ) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        Ok(conn.execute(
            "UPDATE pii_patterns SET name = ?1, regex_pattern = ?2, sensitive = ?3, on_key = ?4 \
             WHERE name = ?5",
            params![
                data.name.as_str(),
                data.regex_pattern,
                data.sensitive,
                data.on_key,
                name.as_str()
            ],
        )?)
    }

    fn create(&mut self, data: &PatternRecord) -> Result<StoredPattern, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO pii_patterns (name, regex_pattern, sensitive, on_key) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                data.name.as_str(),
                data.regex_pattern,
                data.sensitive,
                data.on_key
            ],
        )?;
        Ok(StoredPattern {
            id: conn.last_insert_rowid(),
            record: data.clone(),
        })
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.conn()?.execute_batch("BEGIN IMMEDIATE")?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.conn()?.execute_batch("COMMIT")?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.conn()?.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), StoreError> {
        if self.in_transaction {
            self.rollback()?;
        }
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, err)| StoreError::Sqlite(err)),
            None => Ok(()),
        }
    }
}

fn row_to_pattern(row: &Row<'_>) -> rusqlite::Result<StoredPattern> {
    Ok(StoredPattern {
        id: row.get(0)?,
        record: PatternRecord {
            name: PatternName(row.get(1)?),
            regex_pattern: row.get(2)?,
            sensitive: row.get(3)?,
            on_key: row.get(4)?,
        },
    })
}
