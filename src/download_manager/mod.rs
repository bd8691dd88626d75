//! Download lifecycle management.
//!
//! Runs the external downloader for accepted recordings, locates the file it
//! wrote and moves each recording to its terminal status.

mod artifact;
mod downloader;
mod orchestrator;

pub use artifact::{find_artifact, output_prefix, output_template, sanitize_title};
pub use downloader::{DownloadError, DownloadRequest, RecordingDownloader, YtDlpDownloader};
pub use orchestrator::{DownloadOrchestrator, DOWNLOAD_STARTED_MESSAGE};
