//! Drives a recording through its download lifecycle.
//!
//! pending → downloading happens in the caller's task when the recording is
//! accepted. Everything after that runs in one spawned task per recording,
//! which is the only writer of that recording's status.

use super::artifact::{find_artifact, output_prefix, output_template};
use super::downloader::{DownloadError, DownloadRequest, RecordingDownloader};
use crate::delivery::{DeliveryService, TextFormat};
use crate::recording::{Recording, RecordingStatus, RecordingStore};
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub const DOWNLOAD_STARTED_MESSAGE: &str = "🔍 Zoom link detected! Downloading recording...";

pub struct DownloadOrchestrator {
    store: Arc<dyn RecordingStore>,
    downloader: Arc<dyn RecordingDownloader>,
    delivery: Arc<DeliveryService>,
    downloads_dir: PathBuf,
}

impl DownloadOrchestrator {
    pub fn new(
        store: Arc<dyn RecordingStore>,
        downloader: Arc<dyn RecordingDownloader>,
        delivery: Arc<DeliveryService>,
        downloads_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            downloader,
            delivery,
            downloads_dir,
        }
    }

    /// Claims a pending recording and starts its download task.
    ///
    /// Sends the submission notification once the recording is downloading.
    /// `recording` is updated in place to the downloading status.
    /// The returned handle resolves to the terminal status.
    pub async fn accept(
        self: &Arc<Self>,
        recording: &mut Recording,
        channel: i64,
    ) -> Result<JoinHandle<RecordingStatus>> {
        if !self.store.mark_downloading(recording.id)? {
            bail!("Recording {} is not pending", recording.id);
        }
        recording.status = RecordingStatus::Downloading;
        info!("Accepted recording {} ({})", recording.id, recording.title);

        if let Err(e) = self
            .delivery
            .transport()
            .send_text(channel, DOWNLOAD_STARTED_MESSAGE, TextFormat::Plain)
            .await
        {
            warn!("Failed to notify {} about recording {}: {}", channel, recording.id, e);
        }

        let orchestrator = self.clone();
        let recording = recording.clone();
        Ok(tokio::spawn(async move {
            orchestrator.run_download(recording, channel).await
        }))
    }

    /// Runs the downloader, records the outcome and notifies the channel.
    /// Returns the status the recording ended in.
    pub async fn run_download(&self, mut recording: Recording, channel: i64) -> RecordingStatus {
        match self.fetch_and_complete(&recording).await {
            Ok(path) => {
                info!("Recording {} downloaded to {}", recording.id, path.display());
                recording.status = RecordingStatus::Completed;
                recording.file_path = Some(path);
                self.delivery.deliver(channel, &recording).await;
                RecordingStatus::Completed
            }
            Err(e) => {
                error!("Download of recording {} failed: {:#}", recording.id, e);
                let status = match self.store.mark_failed(recording.id) {
                    Ok(true) => RecordingStatus::Failed,
                    Ok(false) => {
                        warn!("Recording {} was no longer downloading", recording.id);
                        self.stored_status(recording.id)
                    }
                    Err(store_err) => {
                        error!(
                            "Could not mark recording {} as failed: {}",
                            recording.id, store_err
                        );
                        RecordingStatus::Downloading
                    }
                };

                let text = format!("❌ Download failed: {}", e);
                if let Err(send_err) = self
                    .delivery
                    .transport()
                    .send_text(channel, &text, TextFormat::Plain)
                    .await
                {
                    warn!("Failed to report download failure to {}: {}", channel, send_err);
                }
                status
            }
        }
    }

    async fn fetch_and_complete(&self, recording: &Recording) -> Result<PathBuf> {
        let path = self.fetch(recording).await?;
        if !self.store.mark_completed(recording.id, &path)? {
            bail!("Recording {} was no longer downloading", recording.id);
        }
        Ok(path)
    }

    async fn fetch(&self, recording: &Recording) -> Result<PathBuf, DownloadError> {
        let prefix = output_prefix(&recording.title, recording.id);
        let request = DownloadRequest {
            url: recording.zoom_url.clone(),
            passcode: recording.passcode.clone(),
            output_template: output_template(&self.downloads_dir, &prefix),
        };

        self.downloader.download(&request).await?;

        find_artifact(&self.downloads_dir, &prefix)
            .await?
            .ok_or(DownloadError::ArtifactMissing { prefix })
    }

    fn stored_status(&self, id: i64) -> RecordingStatus {
        match self.store.get_recording(id) {
            Ok(Some(recording)) => recording.status,
            Ok(None) | Err(_) => RecordingStatus::Downloading,
        }
    }
}
