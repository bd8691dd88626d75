//! Test fixture creation for the recordings database and artifacts

use super::constants::*;
use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use zoom_archive_server::recording::{NewRecording, RecordingStore, SqliteRecordingStore};

/// Ids of the recordings written by [`create_test_db_with_recordings`].
#[derive(Debug, Clone, Copy)]
pub struct SeededRecordings {
    pub math: i64,
    pub grammar: i64,
    pub history: i64,
}

fn new_recording(title: &str) -> NewRecording {
    NewRecording {
        title: title.to_string(),
        date: SEEDED_DATE.to_string(),
        zoom_url: SEEDED_URL.to_string(),
        passcode: SEEDED_PASSCODE.to_string(),
        uploaded_by: UPLOADER_ID,
    }
}

/// Creates a recordings database in a temp dir with three recordings:
/// a completed one with its artifact, a completed one whose artifact is
/// gone, and a pending one.
/// Returns (temp_dir, db_path, seeded ids)
pub fn create_test_db_with_recordings() -> Result<(TempDir, PathBuf, SeededRecordings)> {
    let dir = TempDir::new()?;
    let downloads = dir.path().join("downloads");
    fs::create_dir_all(&downloads)?;

    let db_path = dir.path().join("zoom_bot.db");
    let store = SqliteRecordingStore::new(&db_path)?;
    store.grant_upload(UPLOADER_ID)?;

    let math = store.create_recording(&new_recording(MATH_TITLE))?.id;
    let math_artifact = downloads.join(format!("Math_Class_{}.mp4", math));
    fs::write(&math_artifact, MATH_ARTIFACT_BYTES)?;
    store.mark_downloading(math)?;
    store.mark_completed(math, &math_artifact)?;

    let grammar = store.create_recording(&new_recording(GRAMMAR_TITLE))?.id;
    store.mark_downloading(grammar)?;
    store.mark_completed(grammar, &downloads.join(format!("Arabic_Grammar_{}.webm", grammar)))?;

    let history = store.create_recording(&new_recording(HISTORY_TITLE))?.id;

    Ok((
        dir,
        db_path,
        SeededRecordings {
            math,
            grammar,
            history,
        },
    ))
}
