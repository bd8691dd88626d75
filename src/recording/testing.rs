//! Store wrapper that fails selected operations.

use super::models::*;
use super::store::{RecordingStore, SqliteRecordingStore};
use anyhow::{bail, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    GetPrincipal,
    CreateRecording,
    MarkDownloading,
    SetFileHandle,
}

/// Delegates to an in-memory SQLite store, except for the operations in
/// `failing`, which return a "database is locked" error.
pub struct FlakyStore {
    pub inner: SqliteRecordingStore,
    failing: Vec<StoreOp>,
}

impl FlakyStore {
    pub fn failing(ops: &[StoreOp]) -> Self {
        Self {
            inner: SqliteRecordingStore::in_memory().unwrap(),
            failing: ops.to_vec(),
        }
    }

    fn check(&self, op: StoreOp) -> Result<()> {
        if self.failing.contains(&op) {
            bail!("database is locked");
        }
        Ok(())
    }
}

impl RecordingStore for FlakyStore {
    fn upsert_principal(&self, telegram_id: i64, username: Option<&str>) -> Result<()> {
        self.inner.upsert_principal(telegram_id, username)
    }

    fn get_principal(&self, telegram_id: i64) -> Result<Option<Principal>> {
        self.check(StoreOp::GetPrincipal)?;
        self.inner.get_principal(telegram_id)
    }

    fn grant_upload(&self, telegram_id: i64) -> Result<()> {
        self.inner.grant_upload(telegram_id)
    }

    fn list_authorized_principals(&self) -> Result<Vec<i64>> {
        self.inner.list_authorized_principals()
    }

    fn create_recording(&self, recording: &NewRecording) -> Result<Recording> {
        self.check(StoreOp::CreateRecording)?;
        self.inner.create_recording(recording)
    }

    fn get_recording(&self, id: i64) -> Result<Option<Recording>> {
        self.inner.get_recording(id)
    }

    fn mark_downloading(&self, id: i64) -> Result<bool> {
        self.check(StoreOp::MarkDownloading)?;
        self.inner.mark_downloading(id)
    }

    fn mark_completed(&self, id: i64, file_path: &Path) -> Result<bool> {
        self.inner.mark_completed(id, file_path)
    }

    fn mark_failed(&self, id: i64) -> Result<bool> {
        self.inner.mark_failed(id)
    }

    fn set_file_handle(&self, file_path: &Path, handle: &RemoteFileHandle) -> Result<bool> {
        self.check(StoreOp::SetFileHandle)?;
        self.inner.set_file_handle(file_path, handle)
    }

    fn search_by_title(&self, text: &str, limit: Option<usize>) -> Result<Vec<Recording>> {
        self.inner.search_by_title(text, limit)
    }

    fn list_recent(&self, limit: Option<usize>) -> Result<Vec<Recording>> {
        self.inner.list_recent(limit)
    }
}
