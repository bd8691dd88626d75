//! Outbound chat transport abstraction.

use crate::recording::RemoteFileHandle;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// How the transport should interpret message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    /// Telegram HTML subset; callers escape user-provided text.
    Html,
}

/// Sends messages and documents to a chat channel.
///
/// Document captions are always HTML.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, channel: i64, text: &str, format: TextFormat) -> Result<()>;

    /// Uploads a local file and returns the handle the transport assigned to it.
    async fn send_document(
        &self,
        channel: i64,
        path: &Path,
        caption: &str,
    ) -> Result<RemoteFileHandle>;

    /// Re-sends a previously uploaded document without transferring its bytes.
    async fn send_cached_document(
        &self,
        channel: i64,
        handle: &RemoteFileHandle,
        caption: &str,
    ) -> Result<()>;
}
