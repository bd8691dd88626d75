//! Turns inbound chat messages into accepted recordings.

use super::parser::{parse, LinkDescriptor};
use crate::access::AccessGate;
use crate::delivery::{ChatTransport, TextFormat};
use crate::download_manager::DownloadOrchestrator;
use crate::recording::{NewRecording, Recording, RecordingStatus, RecordingStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

pub const PROCESSING_ERROR_MESSAGE: &str = "❌ Error processing the Zoom link";

/// A plain-text chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: i64,
    pub channel: i64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAuthorized,
    NotASubmission,
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Nothing was stored and nothing was sent.
    Ignored(IgnoreReason),
    /// The recording is downloading; `download` resolves to its final status.
    Accepted {
        recording: Recording,
        download: JoinHandle<RecordingStatus>,
    },
    /// The submission was lost; the sender got a generic error.
    Failed(String),
}

pub struct IngestionService {
    gate: Arc<AccessGate>,
    store: Arc<dyn RecordingStore>,
    orchestrator: Arc<DownloadOrchestrator>,
    transport: Arc<dyn ChatTransport>,
}

impl IngestionService {
    pub fn new(
        gate: Arc<AccessGate>,
        store: Arc<dyn RecordingStore>,
        orchestrator: Arc<DownloadOrchestrator>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            gate,
            store,
            orchestrator,
            transport,
        }
    }

    pub async fn submit(&self, message: InboundMessage) -> SubmissionOutcome {
        let authorized = match self.gate.is_authorized(message.sender_id) {
            Ok(authorized) => authorized,
            Err(e) => {
                error!("Permission lookup for {} failed: {}", message.sender_id, e);
                return match parse(&message.text) {
                    Some(_) => self.fail(message.channel, e).await,
                    None => SubmissionOutcome::Ignored(IgnoreReason::NotASubmission),
                };
            }
        };
        if !authorized {
            debug!("Ignoring message from unauthorized {}", message.sender_id);
            return SubmissionOutcome::Ignored(IgnoreReason::NotAuthorized);
        }

        let Some(descriptor) = parse(&message.text) else {
            return SubmissionOutcome::Ignored(IgnoreReason::NotASubmission);
        };

        let mut recording = match self
            .store
            .create_recording(&new_recording(descriptor, message.sender_id))
        {
            Ok(recording) => recording,
            Err(e) => return self.fail(message.channel, e).await,
        };

        let accepted = self.orchestrator.accept(&mut recording, message.channel).await;
        match accepted {
            Ok(download) => SubmissionOutcome::Accepted {
                recording,
                download,
            },
            Err(e) => self.fail(message.channel, e).await,
        }
    }

    async fn fail(&self, channel: i64, e: anyhow::Error) -> SubmissionOutcome {
        error!("Error processing Zoom link: {:#}", e);
        if let Err(send_err) = self
            .transport
            .send_text(channel, PROCESSING_ERROR_MESSAGE, TextFormat::Plain)
            .await
        {
            warn!("Failed to report processing error to {}: {}", channel, send_err);
        }
        SubmissionOutcome::Failed(e.to_string())
    }
}

fn new_recording(descriptor: LinkDescriptor, uploaded_by: i64) -> NewRecording {
    NewRecording {
        title: descriptor.title,
        date: descriptor.date,
        zoom_url: descriptor.url,
        passcode: descriptor.passcode,
        uploaded_by,
    }
}
