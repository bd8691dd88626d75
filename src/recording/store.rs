//! Recording storage and persistence.
//!
//! SQLite-backed storage for principals and recordings. Lifecycle
//! transitions are guarded in SQL so an out-of-order update is a no-op.

use super::models::*;
use super::schema::RECORDINGS_VERSIONED_SCHEMAS;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Trait for recording catalogue storage operations.
pub trait RecordingStore: Send + Sync {
    // === Principals ===

    /// Insert a principal on first contact, or refresh its username.
    /// Never touches the upload permission.
    fn upsert_principal(&self, telegram_id: i64, username: Option<&str>) -> Result<()>;

    /// Get a principal by Telegram id.
    fn get_principal(&self, telegram_id: i64) -> Result<Option<Principal>>;

    /// Allow a principal to submit recordings, creating it if unknown.
    fn grant_upload(&self, telegram_id: i64) -> Result<()>;

    /// Telegram ids of every principal allowed to upload.
    fn list_authorized_principals(&self) -> Result<Vec<i64>>;

    // === Recordings ===

    /// Insert a new recording in the pending state.
    fn create_recording(&self, recording: &NewRecording) -> Result<Recording>;

    /// Get a recording by id.
    fn get_recording(&self, id: i64) -> Result<Option<Recording>>;

    // === State Transitions (guarded) ===

    /// PENDING → DOWNLOADING. Returns false if the recording was not pending.
    fn mark_downloading(&self, id: i64) -> Result<bool>;

    /// DOWNLOADING → COMPLETED, recording the artifact path.
    /// Returns false if the recording was not downloading.
    fn mark_completed(&self, id: i64, file_path: &Path) -> Result<bool>;

    /// DOWNLOADING → FAILED. Returns false if the recording was not downloading.
    fn mark_failed(&self, id: i64) -> Result<bool>;

    /// Store the transport handle for every recording pointing at `file_path`
    /// that has none yet. Returns false if a handle was already present.
    fn set_file_handle(&self, file_path: &Path, handle: &RemoteFileHandle) -> Result<bool>;

    // === Queries (newest first) ===

    /// Case-insensitive substring match on title. `None` means no limit.
    fn search_by_title(&self, text: &str, limit: Option<usize>) -> Result<Vec<Recording>>;

    /// All recordings. `None` means no limit.
    fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Recording>>;
}

/// SQLite-backed recording store.
pub struct SqliteRecordingStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordingStore {
    /// Opens an existing database or creates a new one with the current schema.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                &db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(&db_path)?;
            RECORDINGS_VERSIONED_SCHEMAS
                .last()
                .context("No schemas defined")?
                .create(&conn)?;
            info!("Created new recordings database at {:?}", db_path.as_ref());
            conn
        };

        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Recordings database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;

        if version >= RECORDINGS_VERSIONED_SCHEMAS.len() {
            bail!(
                "Recordings database version {} is too new (max supported: {})",
                version,
                RECORDINGS_VERSIONED_SCHEMAS.len() - 1
            );
        }

        RECORDINGS_VERSIONED_SCHEMAS
            .get(version)
            .context("Failed to get schema")?
            .validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteRecordingStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        RECORDINGS_VERSIONED_SCHEMAS
            .last()
            .context("No schemas defined")?
            .create(&conn)?;

        Ok(SqliteRecordingStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, current_version: usize) -> Result<()> {
        let target_version = RECORDINGS_VERSIONED_SCHEMAS.len() - 1;
        if current_version >= target_version {
            return Ok(());
        }

        info!(
            "Migrating recordings database from version {} to {}",
            current_version, target_version
        );
        for schema in RECORDINGS_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                migration_fn(conn)?;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + target_version),
            [],
        )?;
        Ok(())
    }

    fn row_to_recording(row: &rusqlite::Row) -> rusqlite::Result<Recording> {
        let status: String = row.get("status")?;
        Ok(Recording {
            id: row.get("id")?,
            title: row.get("title")?,
            date: row.get("date")?,
            zoom_url: row.get("zoom_url")?,
            passcode: row.get("passcode")?,
            file_path: row.get::<_, Option<String>>("file_path")?.map(PathBuf::from),
            file_id: row.get::<_, Option<String>>("file_id")?.map(RemoteFileHandle),
            uploaded_by: row.get("uploaded_by")?,
            status: RecordingStatus::from_db_str(&status).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    format!("unknown recording status '{}'", status).into(),
                )
            })?,
            created_at: row.get("created_at")?,
        })
    }

    fn row_to_principal(row: &rusqlite::Row) -> rusqlite::Result<Principal> {
        Ok(Principal {
            telegram_id: row.get("telegram_id")?,
            username: row.get("username")?,
            can_upload: row.get::<_, Option<String>>("can_upload")?.as_deref() == Some("yes"),
            created_at: row.get("created_at")?,
        })
    }

    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn path_to_db(path: &Path) -> Result<&str> {
        path.to_str()
            .with_context(|| format!("Path is not valid UTF-8: {:?}", path))
    }

    /// Moves a recording into `to` if it currently sits in the one state
    /// that may precede it.
    fn transition(&self, id: i64, to: RecordingStatus, file_path: Option<&str>) -> Result<bool> {
        let from = match to.required_predecessor() {
            Some(from) => from,
            None => bail!("Recordings can't transition into {}", to),
        };
        debug_assert!(from.can_transition_to(to));
        let conn = self.conn.lock().unwrap();
        let changed = match file_path {
            Some(path) => conn.execute(
                r#"UPDATE zoom_records SET status = ?1, file_path = ?2
                   WHERE id = ?3 AND status = ?4 AND file_path IS NULL"#,
                params![to.as_db_str(), path, id, from.as_db_str()],
            )?,
            None => conn.execute(
                "UPDATE zoom_records SET status = ?1 WHERE id = ?2 AND status = ?3",
                params![to.as_db_str(), id, from.as_db_str()],
            )?,
        };
        Ok(changed > 0)
    }

    fn query_recordings(
        &self,
        filter: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Recording>> {
        // LIMIT -1 means unbounded in SQLite
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let conn = self.conn.lock().unwrap();
        let items = match filter {
            Some(pattern) => {
                let mut stmt = conn.prepare(
                    r#"SELECT * FROM zoom_records
                       WHERE title LIKE ?1 ESCAPE '\'
                       ORDER BY created_at DESC, id DESC
                       LIMIT ?2"#,
                )?;
                let rows = stmt.query_map(params![pattern, limit], Self::row_to_recording)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    r#"SELECT * FROM zoom_records
                       ORDER BY created_at DESC, id DESC
                       LIMIT ?1"#,
                )?;
                let rows = stmt.query_map(params![limit], Self::row_to_recording)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(items)
    }
}

/// Builds a LIKE pattern matching `text` anywhere, with wildcards escaped.
fn substring_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl RecordingStore for SqliteRecordingStore {
    fn upsert_principal(&self, telegram_id: i64, username: Option<&str>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO users (telegram_id, username, can_upload, created_at)
               VALUES (?1, ?2, 'no', ?3)
               ON CONFLICT(telegram_id) DO UPDATE SET username = excluded.username"#,
            params![telegram_id, username, Self::now()],
        )?;
        Ok(())
    }

    fn get_principal(&self, telegram_id: i64) -> Result<Option<Principal>> {
        let conn = self.conn.lock().unwrap();
        let principal = conn
            .query_row(
                "SELECT * FROM users WHERE telegram_id = ?1",
                [telegram_id],
                Self::row_to_principal,
            )
            .optional()?;
        Ok(principal)
    }

    fn grant_upload(&self, telegram_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO users (telegram_id, can_upload, created_at)
               VALUES (?1, 'yes', ?2)
               ON CONFLICT(telegram_id) DO UPDATE SET can_upload = 'yes'"#,
            params![telegram_id, Self::now()],
        )?;
        Ok(())
    }

    fn list_authorized_principals(&self) -> Result<Vec<i64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT telegram_id FROM users WHERE can_upload = 'yes'")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    fn create_recording(&self, recording: &NewRecording) -> Result<Recording> {
        let conn = self.conn.lock().unwrap();
        let created_at = Self::now();
        conn.execute(
            r#"INSERT INTO zoom_records (
                title, date, zoom_url, passcode, uploaded_by, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                recording.title,
                recording.date,
                recording.zoom_url,
                recording.passcode,
                recording.uploaded_by,
                RecordingStatus::Pending.as_db_str(),
                created_at,
            ],
        )?;

        Ok(Recording {
            id: conn.last_insert_rowid(),
            title: recording.title.clone(),
            date: recording.date.clone(),
            zoom_url: recording.zoom_url.clone(),
            passcode: recording.passcode.clone(),
            file_path: None,
            file_id: None,
            uploaded_by: recording.uploaded_by,
            status: RecordingStatus::Pending,
            created_at,
        })
    }

    fn get_recording(&self, id: i64) -> Result<Option<Recording>> {
        let conn = self.conn.lock().unwrap();
        let recording = conn
            .query_row(
                "SELECT * FROM zoom_records WHERE id = ?1",
                [id],
                Self::row_to_recording,
            )
            .optional()?;
        Ok(recording)
    }

    fn mark_downloading(&self, id: i64) -> Result<bool> {
        self.transition(id, RecordingStatus::Downloading, None)
    }

    fn mark_completed(&self, id: i64, file_path: &Path) -> Result<bool> {
        let path = Self::path_to_db(file_path)?;
        self.transition(id, RecordingStatus::Completed, Some(path))
    }

    fn mark_failed(&self, id: i64) -> Result<bool> {
        self.transition(id, RecordingStatus::Failed, None)
    }

    fn set_file_handle(&self, file_path: &Path, handle: &RemoteFileHandle) -> Result<bool> {
        let path = Self::path_to_db(file_path)?;
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE zoom_records SET file_id = ?1 WHERE file_path = ?2 AND file_id IS NULL",
            params![handle.as_str(), path],
        )?;
        Ok(changed > 0)
    }

    fn search_by_title(&self, text: &str, limit: Option<usize>) -> Result<Vec<Recording>> {
        self.query_recordings(Some(substring_pattern(text)), limit)
    }

    fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Recording>> {
        self.query_recordings(None, limit)
    }
}
