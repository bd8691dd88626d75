use crate::delivery::{ChatTransport, TextFormat};
use crate::recording::RemoteFileHandle;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

/// [`ChatTransport`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, channel: i64, text: &str, format: TextFormat) -> Result<()> {
        let request = self.bot.send_message(ChatId(channel), text);
        let request = match format {
            TextFormat::Plain => request,
            TextFormat::Html => request.parse_mode(ParseMode::Html),
        };
        request.await?;
        Ok(())
    }

    async fn send_document(
        &self,
        channel: i64,
        path: &Path,
        caption: &str,
    ) -> Result<RemoteFileHandle> {
        let message = self
            .bot
            .send_document(ChatId(channel), InputFile::file(path.to_path_buf()))
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .disable_content_type_detection(true)
            .await?;
        uploaded_handle(&message)
    }

    async fn send_cached_document(
        &self,
        channel: i64,
        handle: &RemoteFileHandle,
        caption: &str,
    ) -> Result<()> {
        self.bot
            .send_document(ChatId(channel), InputFile::file_id(handle.0.clone()))
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

/// The file handle Telegram assigned to an uploaded document. Large uploads
/// can come back as a video.
fn uploaded_handle(message: &Message) -> Result<RemoteFileHandle> {
    let file = message
        .document()
        .map(|d| &d.file)
        .or_else(|| message.video().map(|v| &v.file))
        .context("Telegram returned no file for the uploaded document")?;
    Ok(RemoteFileHandle(file.id.clone()))
}
