//! Ingestion of Zoom share messages.
//!
//! 1. The sender's upload permission is checked
//! 2. The message is parsed into a link descriptor
//! 3. A pending recording is stored and handed to the download orchestrator
//!
//! Unauthorized senders and ordinary chat are dropped without a reply.

mod parser;
mod service;

pub use parser::{
    parse, parse_with_default_date, LinkDescriptor, DEFAULT_TITLE, ZOOM_DOMAIN_MARKER,
};
pub use service::{
    IgnoreReason, InboundMessage, IngestionService, SubmissionOutcome,
    PROCESSING_ERROR_MESSAGE,
};
