//! Embedded audit history: an append-only SQLite table keyed by URL with a
//! time index, plus the full report serialized alongside each row.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::info;

use crate::core::types::{AuditReport, HistoryEntry};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS audits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    overall_score REAL NOT NULL,
    robots_score REAL NOT NULL,
    llms_txt_score REAL NOT NULL,
    schema_org_score REAL NOT NULL,
    content_score REAL NOT NULL,
    report_json TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_audits_url ON audits (url);
CREATE INDEX IF NOT EXISTS idx_audits_timestamp ON audits (timestamp);
";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("history report serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history store is closed")]
    Closed,
}

/// SQLite-backed audit history store.
///
/// Writes are serialized through the internal lock, so concurrent audits
/// saving into the same store get distinct, monotonically increasing ids.
/// `close` is idempotent; any call after it returns [`HistoryError::Closed`].
pub struct HistoryStore {
    conn: Mutex<Option<Connection>>,
    path: PathBuf,
}

impl HistoryStore {
    /// Open (creating if needed) the store at `path`. Parent directories are
    /// created on first use.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "history store opened");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path,
        })
    }

    /// Open the store at the user-data default, `~/.aeolint/history.db`.
    pub fn open_default() -> Result<Self, HistoryError> {
        Self::open(default_db_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, HistoryError>,
    ) -> Result<T, HistoryError> {
        let guard = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(HistoryError::Closed),
        }
    }

    /// Insert a report and return its row id. The timestamp is assigned here,
    /// in UTC ISO-8601.
    pub fn save(&self, report: &AuditReport) -> Result<i64, HistoryError> {
        let report_json = serde_json::to_string(report)?;
        let timestamp = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO audits
                 (url, timestamp, overall_score, robots_score, llms_txt_score,
                  schema_org_score, content_score, report_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    report.url,
                    timestamp,
                    report.overall_score,
                    report.robots.score,
                    report.llms_txt.score,
                    report.schema_org.score,
                    report.content.score,
                    report_json,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Recent entries for a URL, newest first, capped at `limit`.
    pub fn list_entries(&self, url: &str, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, timestamp, overall_score, robots_score,
                        llms_txt_score, schema_org_score, content_score
                 FROM audits WHERE url = ?1
                 ORDER BY timestamp DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![url, limit as i64], |row| {
                Ok(HistoryEntry {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    timestamp: row.get(2)?,
                    overall_score: row.get(3)?,
                    robots_score: row.get(4)?,
                    llms_txt_score: row.get(5)?,
                    schema_org_score: row.get(6)?,
                    content_score: row.get(7)?,
                })
            })?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
    }

    /// Rehydrate the full report for a row id.
    pub fn get_report(&self, id: i64) -> Result<Option<AuditReport>, HistoryError> {
        let report_json: Option<String> = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT report_json FROM audits WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?)
        })?;
        match report_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Most recent entry for a URL, if any.
    pub fn get_latest(&self, url: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.list_entries(url, 1)?.into_iter().next())
    }

    /// Most recent full report for a URL, if any.
    pub fn get_latest_report(&self, url: &str) -> Result<Option<AuditReport>, HistoryError> {
        match self.get_latest(url)? {
            Some(entry) => self.get_report(entry.id),
            None => Ok(None),
        }
    }

    /// Delete every entry for a URL; returns the number of rows removed.
    pub fn delete_url(&self, url: &str) -> Result<usize, HistoryError> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM audits WHERE url = ?1", params![url])?))
    }

    /// Close the store. Safe to call more than once.
    pub fn close(&self) {
        let mut guard = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(conn) = guard.take() {
            // Close failures only matter for diagnostics; the handle is gone
            // either way.
            if let Err((_, e)) = conn.close() {
                tracing::warn!("history store close error: {e}");
            }
        }
    }
}

/// Default on-disk location: `~/.aeolint/history.db`, falling back to the
/// relative path when no home directory is resolvable.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aeolint")
        .join("history.db")
}
