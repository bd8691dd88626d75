//! Search and listing over stored recordings, for chat and web.

mod chat;
mod query;

pub use chat::{CatalogueChat, LIST_ERROR_MESSAGE, NO_RECENT_MESSAGE, SEARCH_ERROR_MESSAGE};
pub use query::{CatalogueQuery, QueryResult, RECENT_LIMIT, SEARCH_LIMIT};
