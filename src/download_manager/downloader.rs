//! External downloader invocation.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors that end a download in the failed state.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("downloader exited with {status}: {stderr}")]
    NonZeroExit { status: String, stderr: String },

    #[error("Downloaded file not found (expected {prefix}.*)")]
    ArtifactMissing { prefix: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the downloader needs for one recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub passcode: String,
    /// Output path with a `%(ext)s` placeholder for the extension.
    pub output_template: PathBuf,
}

/// Fetches a password-protected recording to disk.
#[async_trait]
pub trait RecordingDownloader: Send + Sync {
    /// Runs to completion. Success only means the tool reported success;
    /// the caller still has to locate the file it wrote.
    async fn download(&self, request: &DownloadRequest) -> Result<(), DownloadError>;
}

/// Runs `yt-dlp` (or a compatible executable) as a subprocess.
pub struct YtDlpDownloader {
    executable: PathBuf,
}

impl YtDlpDownloader {
    pub const DEFAULT_EXECUTABLE: &'static str = "yt-dlp";

    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EXECUTABLE)
    }
}

#[async_trait]
impl RecordingDownloader for YtDlpDownloader {
    async fn download(&self, request: &DownloadRequest) -> Result<(), DownloadError> {
        debug!(
            "Running {} for {}",
            self.executable.display(),
            request.url
        );
        let output = Command::new(&self.executable)
            .arg("--video-password")
            .arg(&request.passcode)
            .arg("-o")
            .arg(&request.output_template)
            .arg(&request.url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| DownloadError::Spawn {
                program: self.executable.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DownloadError::NonZeroExit {
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(())
    }
}
