//! Zoom Recording Archive Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod access;
pub mod bot;
pub mod catalogue;
pub mod config;
pub mod delivery;
pub mod download_manager;
pub mod ingestion;
pub mod recording;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use recording::{RecordingStore, SqliteRecordingStore};
pub use server::{run_server, RequestsLoggingLevel};
