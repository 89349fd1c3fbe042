// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite activity store with typed operations.
//!
//! Owns the on-disk database file, schema creation and the shared
//! connection. Rows are immutable once written; there are no update or
//! delete operations.

use crate::error::AppError;
use crate::models::{ActivityRecord, ActivityType};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const DB_FILE_NAME: &str = "activities.db";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    request_id TEXT NOT NULL,
    activity_type TEXT NOT NULL,
    path TEXT NOT NULL,
    method TEXT NOT NULL,
    status_code INTEGER NOT NULL DEFAULT 0,
    user_currency TEXT NOT NULL DEFAULT 'USD',
    details TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_activities_session ON activities(session_id);
CREATE INDEX IF NOT EXISTS idx_activities_created_at ON activities(created_at);
CREATE INDEX IF NOT EXISTS idx_activities_type ON activities(activity_type);
"#;

const SELECT_COLUMNS: &str = "id, session_id, request_id, activity_type, path, method, \
     status_code, user_currency, details, created_at";

/// Shared handle to the activity database.
///
/// Cloning is cheap; all clones share one connection. The connection is
/// process-wide state: requests take the mutex only for the duration of
/// a single statement, and WAL keeps readers unblocked at the file
/// level.
#[derive(Clone)]
pub struct ActivityStore {
    conn: Option<Arc<Mutex<Connection>>>,
}

impl ActivityStore {
    /// Open (or create) the activity database under `data_dir`.
    ///
    /// Creates the directory and schema when missing and enables WAL.
    /// Safe to call again on the same directory: the schema statements
    /// are idempotent. Any setup failure aborts before a handle exists.
    pub fn open(data_dir: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| AppError::Database(format!("create data directory: {e}")))?;

        let db_path = data_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)
            .map_err(|e| AppError::Database(format!("open {}: {e}", db_path.display())))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| AppError::Database(format!("enable WAL: {e}")))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Database(format!("apply schema: {e}")))?;

        tracing::info!(path = %db_path.display(), "Activity database initialized");

        Ok(Self {
            conn: Some(Arc::new(Mutex::new(conn))),
        })
    }

    /// Connectionless handle for offline tests.
    ///
    /// All operations fail with `Uninitialized` if called.
    pub fn new_mock() -> Self {
        Self { conn: None }
    }

    /// Release this handle's reference to the connection.
    ///
    /// No-op on a mock handle; the database file closes once the last
    /// clone drops.
    pub fn shutdown(&mut self) {
        self.conn = None;
    }

    /// Helper to get the connection or report the uninitialized state.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        let conn = self.conn.as_ref().ok_or(AppError::Uninitialized)?;
        conn.lock()
            .map_err(|_| AppError::Database("connection lock poisoned".to_string()))
    }

    fn with_conn<T>(
        &self,
        context: &str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, AppError> {
        let conn = self.conn()?;
        f(&conn).map_err(|e| AppError::Database(format!("{context}: {e}")))
    }

    // ─── Recording ───────────────────────────────────────────────

    /// Insert one activity row and return the assigned row id.
    ///
    /// The creation timestamp is generated here, overriding whatever
    /// the in-flight record carried. Single attempt, no retry.
    pub fn record(&self, activity: &ActivityRecord) -> Result<i64, AppError> {
        self.with_conn("record activity", |conn| {
            conn.execute(
                "INSERT INTO activities (session_id, request_id, activity_type, path, method, \
                     status_code, user_currency, details, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    activity.session_id,
                    activity.request_id,
                    activity.activity_type.as_str(),
                    activity.path,
                    activity.method,
                    activity.status_code,
                    activity.user_currency,
                    activity.details,
                    Utc::now().timestamp_millis(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    // ─── Queries ─────────────────────────────────────────────────

    /// Up to `limit` activities for one session, newest first.
    pub fn activities_by_session(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        self.with_conn("list session activities", |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM activities \
                 WHERE session_id = ?1 \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![session_id, limit], row_to_activity)?;
            rows.collect()
        })
    }

    /// Up to `limit` activities across all sessions, newest first.
    pub fn recent_activities(&self, limit: u32) -> Result<Vec<ActivityRecord>, AppError> {
        self.with_conn("list recent activities", |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM activities \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_activity)?;
            rows.collect()
        })
    }

    /// Count of recorded activities per type with `created_at` in
    /// `[start, end]` inclusive.
    ///
    /// Types with no matching rows are absent from the map, not present
    /// with a zero count.
    pub fn stats_by_type(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<HashMap<String, i64>, AppError> {
        self.with_conn("activity stats", |conn| {
            let mut stmt = conn.prepare(
                "SELECT activity_type, COUNT(*) FROM activities \
                 WHERE created_at BETWEEN ?1 AND ?2 \
                 GROUP BY activity_type",
            )?;
            let rows = stmt.query_map(
                params![start.timestamp_millis(), end.timestamp_millis()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )?;
            rows.collect()
        })
    }
}

fn row_to_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRecord> {
    let type_name: String = row.get(3)?;
    let created_ms: i64 = row.get(9)?;

    Ok(ActivityRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        request_id: row.get(2)?,
        activity_type: ActivityType::from_db(&type_name),
        path: row.get(4)?,
        method: row.get(5)?,
        status_code: row.get(6)?,
        user_currency: row.get(7)?,
        details: row.get(8)?,
        created_at: Utc
            .timestamp_millis_opt(created_ms)
            .single()
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(9, created_ms))?,
    })
}
