//! Read-only queries over the recording catalogue.

use crate::recording::{Recording, RecordingStore};
use anyhow::Result;
use std::sync::Arc;

pub const SEARCH_LIMIT: usize = 10;
pub const RECENT_LIMIT: usize = 5;

/// An empty result is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Found(Vec<Recording>),
    NoResults,
}

impl QueryResult {
    fn from_recordings(recordings: Vec<Recording>) -> Self {
        if recordings.is_empty() {
            QueryResult::NoResults
        } else {
            QueryResult::Found(recordings)
        }
    }

    pub fn recordings(&self) -> &[Recording] {
        match self {
            QueryResult::Found(recordings) => recordings,
            QueryResult::NoResults => &[],
        }
    }
}

pub struct CatalogueQuery {
    store: Arc<dyn RecordingStore>,
}

impl CatalogueQuery {
    pub fn new(store: Arc<dyn RecordingStore>) -> Self {
        Self { store }
    }

    /// Case-insensitive title substring search, newest first.
    pub fn search(&self, text: &str) -> Result<QueryResult> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(QueryResult::NoResults);
        }
        let recordings = self.store.search_by_title(text, Some(SEARCH_LIMIT))?;
        Ok(QueryResult::from_recordings(recordings))
    }

    pub fn list_recent(&self) -> Result<QueryResult> {
        let recordings = self.store.list_recent(Some(RECENT_LIMIT))?;
        Ok(QueryResult::from_recordings(recordings))
    }

    /// Unlimited listing for the web surface. A missing or blank query
    /// lists everything.
    pub fn browse(&self, query: Option<&str>) -> Result<Vec<Recording>> {
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(text) => self.store.search_by_title(text, None),
            None => self.store.list_recent(None),
        }
    }

    pub fn get(&self, id: i64) -> Result<Option<Recording>> {
        self.store.get_recording(id)
    }
}
