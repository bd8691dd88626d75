//! Recording catalogue: principals, recordings and their lifecycle.

mod models;
mod schema;
mod store;
#[cfg(test)]
pub(crate) mod testing;

pub use models::*;
pub use store::{RecordingStore, SqliteRecordingStore};
