//! Data models for the recording catalogue.
//!
//! Defines principals, recordings, their lifecycle status and the remote
//! file handle returned by the chat transport.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lifecycle status of a recording.
///
/// Transitions only move forward: pending → downloading → completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Pending,
    Downloading,
    Completed, // terminal
    Failed,    // terminal
}

impl RecordingStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: RecordingStatus) -> bool {
        match (self, next) {
            (RecordingStatus::Pending, RecordingStatus::Downloading) => true,
            (RecordingStatus::Downloading, RecordingStatus::Completed) => true,
            (RecordingStatus::Downloading, RecordingStatus::Failed) => true,
            (RecordingStatus::Pending, _) => false,
            (RecordingStatus::Downloading, _) => false,
            (RecordingStatus::Completed, _) => false,
            (RecordingStatus::Failed, _) => false,
        }
    }

    /// The status a recording must currently be in to reach `self`.
    /// `None` for the initial status, which is only ever assigned on insert.
    pub fn required_predecessor(&self) -> Option<RecordingStatus> {
        match self {
            RecordingStatus::Pending => None,
            RecordingStatus::Downloading => Some(RecordingStatus::Pending),
            RecordingStatus::Completed | RecordingStatus::Failed => {
                Some(RecordingStatus::Downloading)
            }
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            RecordingStatus::Pending => "pending",
            RecordingStatus::Downloading => "downloading",
            RecordingStatus::Completed => "completed",
            RecordingStatus::Failed => "failed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RecordingStatus::Pending),
            "downloading" => Some(RecordingStatus::Downloading),
            "completed" => Some(RecordingStatus::Completed),
            "failed" => Some(RecordingStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Opaque reference returned by the chat transport after an upload.
/// Re-sending by handle avoids uploading the same bytes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteFileHandle(pub String);

impl RemoteFileHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A chat user known to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub can_upload: bool,
    pub created_at: String,
}

/// Fields needed to insert a recording. The store assigns id, status and
/// creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecording {
    pub title: String,
    pub date: String,
    pub zoom_url: String,
    pub passcode: String,
    pub uploaded_by: i64,
}

/// A catalogued Zoom recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// Assigned by the store
    pub id: i64,
    pub title: String,
    /// Free-form date string as written in the share message
    pub date: String,
    pub zoom_url: String,
    pub passcode: String,
    /// Local artifact, set once when the download completes
    pub file_path: Option<PathBuf>,
    /// Transport handle, set on the first successful upload
    pub file_id: Option<RemoteFileHandle>,
    /// Telegram id of the submitting principal
    pub uploaded_by: i64,
    pub status: RecordingStatus,
    /// RFC 3339 UTC timestamp
    pub created_at: String,
}

impl Recording {
    /// True when a completed recording has something the delivery service
    /// can send: a cached handle or a local file.
    pub fn is_deliverable(&self) -> bool {
        match self.status {
            RecordingStatus::Completed => self.file_id.is_some() || self.file_path.is_some(),
            RecordingStatus::Pending | RecordingStatus::Downloading | RecordingStatus::Failed => {
                false
            }
        }
    }
}
