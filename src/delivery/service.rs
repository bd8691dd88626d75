//! Sends completed recordings back to a chat channel.

use super::transport::{ChatTransport, TextFormat};
use crate::recording::{Recording, RecordingStore, RemoteFileHandle};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use teloxide::utils::html;
use tracing::{debug, error, info, warn};

/// Telegram bot API upload limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// What a delivery attempt ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Re-sent through the stored remote handle.
    SentCached,
    /// Uploaded the local file. `handle_stored` is false when another
    /// delivery stored a handle for the same file first.
    Uploaded {
        handle: RemoteFileHandle,
        handle_stored: bool,
    },
    /// The file exceeds the upload limit; a notice was sent instead.
    OverLimit { size_bytes: u64 },
    /// The recording has no handle and no file.
    NothingToDeliver,
    /// The error was reported to the channel.
    Failed(String),
}

pub struct DeliveryService {
    store: Arc<dyn RecordingStore>,
    transport: Arc<dyn ChatTransport>,
    max_upload_bytes: u64,
}

impl DeliveryService {
    pub fn new(
        store: Arc<dyn RecordingStore>,
        transport: Arc<dyn ChatTransport>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            store,
            transport,
            max_upload_bytes,
        }
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    /// Delivers `recording` to `channel`, preferring the cached remote handle
    /// over the local file. Failures are reported to the channel and never
    /// touch the recording's status.
    pub async fn deliver(&self, channel: i64, recording: &Recording) -> DeliveryOutcome {
        match self.try_deliver(channel, recording).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to deliver recording {}: {:#}", recording.id, e);
                let text = format!("❌ Error sending file: {}", e);
                if let Err(send_err) = self
                    .transport
                    .send_text(channel, &text, TextFormat::Plain)
                    .await
                {
                    warn!("Could not report delivery error to {}: {}", channel, send_err);
                }
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_deliver(&self, channel: i64, recording: &Recording) -> Result<DeliveryOutcome> {
        if !recording.is_deliverable() {
            return Ok(DeliveryOutcome::NothingToDeliver);
        }
        let caption = caption(&recording.title);

        if let Some(handle) = &recording.file_id {
            debug!("Re-sending recording {} by handle", recording.id);
            self.transport
                .send_cached_document(channel, handle, &caption)
                .await?;
            return Ok(DeliveryOutcome::SentCached);
        }

        let Some(path) = recording.file_path.as_deref() else {
            return Ok(DeliveryOutcome::NothingToDeliver);
        };

        let size_bytes = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?
            .len();

        if size_bytes > self.max_upload_bytes {
            info!(
                "Recording {} is {} bytes, over the upload limit",
                recording.id, size_bytes
            );
            let notice = over_limit_notice(&recording.title, size_bytes, path);
            self.transport
                .send_text(channel, &notice, TextFormat::Html)
                .await?;
            return Ok(DeliveryOutcome::OverLimit { size_bytes });
        }

        let handle = self.transport.send_document(channel, path, &caption).await?;
        let handle_stored = match self.store.set_file_handle(path, &handle) {
            Ok(true) => true,
            Ok(false) => {
                debug!("Handle for {} was already stored", path.display());
                false
            }
            Err(e) => {
                warn!("Could not store handle for {}: {:#}", path.display(), e);
                false
            }
        };
        Ok(DeliveryOutcome::Uploaded {
            handle,
            handle_stored,
        })
    }
}

fn caption(title: &str) -> String {
    format!("📁 {}", html::bold(&html::escape(title)))
}

fn over_limit_notice(title: &str, size_bytes: u64, path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "📁 {}\n\n⚠️ File too large for Telegram ({:.1}MB)\nFile saved locally: {}",
        html::bold(&html::escape(title)),
        size_bytes as f64 / BYTES_PER_MB,
        html::escape(&file_name)
    )
}
