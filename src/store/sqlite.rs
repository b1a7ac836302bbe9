//! SQLite-backed progress store
//!
//! Manages `~/.mlquest/progress.db` with automatic schema migration. The
//! merge policy is expressed in the upsert statement itself, so the join is
//! atomic inside SQLite even when several processes share the file.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use super::{ProgressStore, StoreError};
use crate::progress::{LearnerId, ProgressRecord, UnitId};

/// Progress store on a shared SQLite connection
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the progress database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progress db: {}", path.display()))?;

        // WAL lets several sessions on the same machine share the file
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self::from_connection(conn)?;
        info!(path = %path.display(), "Opened progress store");
        Ok(store)
    }

    /// Ephemeral database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize progress schema")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Current schema version
    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.conn.lock().expect("Progress DB lock poisoned");
        let version = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )?;
        Ok(version)
    }

    /// Run a blocking closure against the connection off the async runtime
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().expect("Progress DB lock poisoned");
            f(&conn)
        })
        .await?
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
        .context("Failed to read progress schema version")?;

    // Migration 2: index for completed-unit scans
    if version < 2 {
        conn.execute_batch(
            r#"
            CREATE INDEX IF NOT EXISTS idx_progress_completed
                ON progress_records(learner_id, completed);
            "#,
        )?;
        conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
    }

    Ok(())
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn get_record(
        &self,
        learner: &LearnerId,
        unit: &UnitId,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        let (learner, unit) = (learner.clone(), unit.clone());
        self.with_conn(move |conn| {
            let raw = conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM progress_records WHERE learner_id = ?1 AND unit_id = ?2"),
                    (learner.as_str(), unit.as_str()),
                    RawRow::from_row,
                )
                .optional()?;
            raw.map(RawRow::into_record).transpose()
        })
        .await
    }

    async fn get_all_records(&self, learner: &LearnerId) -> Result<Vec<ProgressRecord>, StoreError> {
        let learner = learner.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM progress_records WHERE learner_id = ?1 ORDER BY unit_id"
            ))?;
            let rows = stmt.query_map([learner.as_str()], RawRow::from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?.into_record()?);
            }
            Ok(records)
        })
        .await
    }

    async fn upsert_record(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        let record = record.clone();
        self.with_conn(move |conn| {
            let raw = conn.query_row(
                &format!("{UPSERT_SQL} RETURNING {COLUMNS}"),
                RawRow::params(&record),
                RawRow::from_row,
            )?;
            raw.into_record()
        })
        .await
    }

    async fn overwrite_record(
        &self,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord, StoreError> {
        let record = record.clone();
        self.with_conn(move |conn| {
            let raw = conn.query_row(
                &format!("{OVERWRITE_SQL} RETURNING {COLUMNS}"),
                RawRow::params(&record),
                RawRow::from_row,
            )?;
            raw.into_record()
        })
        .await
    }
}

/// Row as stored: timestamps are epoch milliseconds
struct RawRow {
    learner_id: String,
    unit_id: String,
    percentage: i64,
    completed: bool,
    completed_at: Option<i64>,
    updated_at: i64,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            learner_id: row.get(0)?,
            unit_id: row.get(1)?,
            percentage: row.get(2)?,
            completed: row.get(3)?,
            completed_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn params(record: &ProgressRecord) -> (String, String, i64, bool, Option<i64>, i64) {
        (
            record.learner_id.to_string(),
            record.unit_id.to_string(),
            i64::from(record.percentage),
            record.completed,
            record.completed_at.map(|t| t.timestamp_millis()),
            record.updated_at.timestamp_millis(),
        )
    }

    fn into_record(self) -> Result<ProgressRecord, StoreError> {
        let percentage = u8::try_from(self.percentage)
            .map_err(|_| StoreError::Corrupt(format!("percentage {}", self.percentage)))?;
        let completed_at = self.completed_at.map(timestamp).transpose()?;
        let record = ProgressRecord {
            learner_id: LearnerId::new(self.learner_id),
            unit_id: UnitId::new(self.unit_id),
            percentage,
            completed: self.completed,
            completed_at,
            updated_at: timestamp(self.updated_at)?,
        };
        record.validate().map_err(StoreError::Corrupt)?;
        Ok(record)
    }
}

fn timestamp(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp {ms} out of range")))
}

const COLUMNS: &str = "learner_id, unit_id, percentage, completed, completed_at, updated_at";

/// Join of the incoming row with the stored one. SET expressions see the
/// stored values; `excluded.*` is the incoming row.
const UPSERT_SQL: &str = r#"
INSERT INTO progress_records (learner_id, unit_id, percentage, completed, completed_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT(learner_id, unit_id) DO UPDATE SET
    percentage = CASE
        WHEN completed OR excluded.completed THEN 100
        ELSE MAX(percentage, excluded.percentage)
    END,
    completed = (completed OR excluded.completed),
    completed_at = CASE
        WHEN completed AND excluded.completed THEN MIN(
            COALESCE(completed_at, excluded.completed_at),
            COALESCE(excluded.completed_at, completed_at)
        )
        WHEN completed THEN completed_at
        WHEN excluded.completed THEN excluded.completed_at
        ELSE NULL
    END,
    updated_at = MAX(updated_at, excluded.updated_at)
"#;

const OVERWRITE_SQL: &str = r#"
INSERT INTO progress_records (learner_id, unit_id, percentage, completed, completed_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT(learner_id, unit_id) DO UPDATE SET
    percentage = excluded.percentage,
    completed = excluded.completed,
    completed_at = excluded.completed_at,
    updated_at = excluded.updated_at
"#;

/// SQL schema for the progress database
const SCHEMA_SQL: &str = r#"
-- One row per (learner, unit)
CREATE TABLE IF NOT EXISTS progress_records (
    learner_id TEXT NOT NULL,
    unit_id TEXT NOT NULL,
    percentage INTEGER NOT NULL DEFAULT 0 CHECK (percentage BETWEEN 0 AND 100),
    completed INTEGER NOT NULL DEFAULT 0,
    completed_at INTEGER,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (learner_id, unit_id)
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
