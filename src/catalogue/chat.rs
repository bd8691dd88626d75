//! Chat rendering of catalogue queries.

use super::query::{CatalogueQuery, QueryResult};
use crate::delivery::{DeliveryOutcome, DeliveryService, TextFormat};
use crate::recording::{Recording, RecordingStatus};
use std::sync::Arc;
use teloxide::utils::html;
use tracing::{error, warn};

pub const SEARCH_ERROR_MESSAGE: &str = "❌ Error searching recordings";
pub const LIST_ERROR_MESSAGE: &str = "❌ Error listing recordings";
pub const NO_RECENT_MESSAGE: &str = "📂 No recordings found";

pub struct CatalogueChat {
    query: Arc<CatalogueQuery>,
    delivery: Arc<DeliveryService>,
}

impl CatalogueChat {
    pub fn new(query: Arc<CatalogueQuery>, delivery: Arc<DeliveryService>) -> Self {
        Self { query, delivery }
    }

    /// Sends the search summary, then delivers every completed match.
    /// Returns the outcome of each delivery.
    pub async fn search_for_channel(&self, channel: i64, text: &str) -> Vec<DeliveryOutcome> {
        let recordings = match self.query.search(text) {
            Ok(QueryResult::Found(recordings)) => recordings,
            Ok(QueryResult::NoResults) => {
                let message = format!("🔍 No recordings found for \"{}\"", text.trim());
                self.send(channel, &message, TextFormat::Plain).await;
                return Vec::new();
            }
            Err(e) => {
                error!("Search for {:?} failed: {:#}", text, e);
                self.send(channel, SEARCH_ERROR_MESSAGE, TextFormat::Plain)
                    .await;
                return Vec::new();
            }
        };

        let header = format!(
            "🔍 <b>Search Results for \"{}\":</b>",
            html::escape(text.trim())
        );
        let summary = render_summary(&header, &recordings, "Status: ");
        self.send(channel, &summary, TextFormat::Html).await;

        let mut outcomes = Vec::new();
        for recording in recordings
            .iter()
            .filter(|r| r.status == RecordingStatus::Completed && r.is_deliverable())
        {
            outcomes.push(self.delivery.deliver(channel, recording).await);
        }
        outcomes
    }

    /// Sends the summary of the most recent recordings. Nothing is delivered.
    pub async fn recent_for_channel(&self, channel: i64) {
        match self.query.list_recent() {
            Ok(QueryResult::Found(recordings)) => {
                let summary = render_summary("📂 <b>Recent Recordings:</b>", &recordings, "");
                self.send(channel, &summary, TextFormat::Html).await;
            }
            Ok(QueryResult::NoResults) => {
                self.send(channel, NO_RECENT_MESSAGE, TextFormat::Plain).await;
            }
            Err(e) => {
                error!("Listing recordings failed: {:#}", e);
                self.send(channel, LIST_ERROR_MESSAGE, TextFormat::Plain).await;
            }
        }
    }

    async fn send(&self, channel: i64, text: &str, format: TextFormat) {
        if let Err(e) = self.delivery.transport().send_text(channel, text, format).await {
            warn!("Failed to send message to {}: {}", channel, e);
        }
    }
}

fn render_summary(header: &str, recordings: &[Recording], status_label: &str) -> String {
    let mut out = format!("{}\n\n", header);
    for recording in recordings {
        out.push_str(&format!(
            "📁 {}\n📅 {}\n📊 {}{}\n\n",
            html::bold(&html::escape(&recording.title)),
            html::escape(&recording.date),
            status_label,
            recording.status
        ));
    }
    out.trim_end().to_string()
}
